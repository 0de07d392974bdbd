//! Statement text for the probe and the batched INSERT.

/// PostgreSQL refuses statements with more bind parameters than this.
pub const MAX_BIND_PARAMETERS: usize = 65535;

/// Quote one identifier, doubling embedded quotes.
///
/// Names keep their case: `ORDERS` does not match a table created as `orders`.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified table name (`schema.table`).
pub fn quote_table(name: &str) -> String {
    name.split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Zero-row query whose result metadata describes the mapped columns.
pub fn probe_sql(table: &str, columns: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE 1 = 0",
        column_list(columns),
        quote_table(table)
    )
}

/// Multi-row INSERT with `row_count` groups of placeholders.
pub fn insert_sql(table: &str, columns: &[String], row_count: usize) -> String {
    let col_count = columns.len();
    let mut placeholders: Vec<String> = Vec::with_capacity(row_count);
    let mut param_idx = 1;

    for _ in 0..row_count {
        let row_placeholders: Vec<String> = (0..col_count)
            .map(|_| {
                let p = format!("${param_idx}");
                param_idx += 1;
                p
            })
            .collect();
        placeholders.push(format!("({})", row_placeholders.join(", ")));
    }

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_table(table),
        column_list(columns),
        placeholders.join(", ")
    )
}

/// Rows per INSERT statement: at most `batch_size`, and never more than the
/// bind parameter limit allows for this many columns.
pub fn rows_per_statement(batch_size: usize, column_count: usize) -> usize {
    let by_params = MAX_BIND_PARAMETERS / column_count.max(1);
    batch_size.min(by_params).max(1)
}
