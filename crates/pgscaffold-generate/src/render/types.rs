use pgscaffold_core::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SqlModule {
    Core,
    Postgres,
}

/// SQLAlchemy column type: import name, module, and the expression used in
/// the `Column(...)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SqlType {
    pub import: &'static str,
    pub module: SqlModule,
    pub expr: String,
}

impl SqlType {
    fn core(import: &'static str) -> Self {
        Self {
            import,
            module: SqlModule::Core,
            expr: import.to_string(),
        }
    }

    fn postgres(import: &'static str) -> Self {
        Self {
            import,
            module: SqlModule::Postgres,
            expr: import.to_string(),
        }
    }

    fn with_expr(mut self, expr: String) -> Self {
        self.expr = expr;
        self
    }
}

fn normalized(declared_type: &str) -> String {
    declared_type.trim().to_ascii_uppercase()
}

pub(crate) fn sql_type(column: &Column) -> SqlType {
    let declared = normalized(&column.declared_type);

    match declared.as_str() {
        "INTEGER" | "INT" | "INT4" | "SERIAL" => SqlType::core("Integer"),
        "BIGINT" | "INT8" | "BIGSERIAL" => SqlType::core("BigInteger"),
        "SMALLINT" | "INT2" | "SMALLSERIAL" => SqlType::core("SmallInteger"),
        "BOOLEAN" | "BOOL" => SqlType::core("Boolean"),
        "REAL" | "FLOAT" | "FLOAT4" | "FLOAT8" | "DOUBLE PRECISION" => SqlType::core("Float"),
        "NUMERIC" | "DECIMAL" => SqlType::core("Numeric"),
        "DATE" => SqlType::core("Date"),
        "TIME" | "TIME WITHOUT TIME ZONE" => SqlType::core("Time"),
        "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => {
            SqlType::core("TIMESTAMP").with_expr("TIMESTAMP(timezone=True)".to_string())
        }
        "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => SqlType::core("TIMESTAMP"),
        "JSON" => SqlType::core("JSON"),
        "JSONB" => SqlType::postgres("JSONB"),
        "UUID" => SqlType::postgres("UUID"),
        "BYTEA" => SqlType::core("LargeBinary"),
        "VARCHAR" | "CHARACTER VARYING" | "CHAR" | "CHARACTER" => {
            let base = SqlType::core("String");
            match column.length {
                Some(length) => base.with_expr(format!("String({length})")),
                None => base,
            }
        }
        _ => SqlType::core("String"),
    }
}

/// Bare SQLAlchemy type expression for a column.
pub fn sqlalchemy_type(column: &Column) -> String {
    sql_type(column).expr
}

/// TypeScript type for a column.
pub fn typescript_type(column: &Column) -> &'static str {
    let declared = normalized(&column.declared_type);

    match declared.as_str() {
        "INTEGER" | "INT" | "INT2" | "INT4" | "INT8" | "SMALLINT" | "BIGINT" | "SERIAL"
        | "BIGSERIAL" | "SMALLSERIAL" | "REAL" | "FLOAT" | "FLOAT4" | "FLOAT8"
        | "DOUBLE PRECISION" | "NUMERIC" | "DECIMAL" => "number",
        "BOOLEAN" | "BOOL" => "boolean",
        "JSON" | "JSONB" => "Record<string, unknown>",
        _ => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(declared_type: &str, length: Option<u32>) -> Column {
        Column {
            name: "c".to_string(),
            declared_type: declared_type.to_string(),
            length,
            nullable: true,
            has_server_default: false,
            default: None,
            is_indexed: false,
            is_unique: false,
            is_primary_key: false,
        }
    }

    #[test]
    fn maps_sqlalchemy_types() {
        assert_eq!(sqlalchemy_type(&column("integer", None)), "Integer");
        assert_eq!(sqlalchemy_type(&column("VARCHAR", Some(120))), "String(120)");
        assert_eq!(sqlalchemy_type(&column("TEXT", None)), "String");
        assert_eq!(
            sqlalchemy_type(&column("timestamp with time zone", None)),
            "TIMESTAMP(timezone=True)"
        );
        assert_eq!(sql_type(&column("uuid", None)).module, SqlModule::Postgres);
        assert_eq!(sqlalchemy_type(&column("tsvector", None)), "String");
    }

    #[test]
    fn maps_typescript_types() {
        assert_eq!(typescript_type(&column("INTEGER", None)), "number");
        assert_eq!(typescript_type(&column("numeric", None)), "number");
        assert_eq!(typescript_type(&column("BOOLEAN", None)), "boolean");
        assert_eq!(typescript_type(&column("TIMESTAMP", None)), "string");
        assert_eq!(typescript_type(&column("jsonb", None)), "Record<string, unknown>");
    }
}
