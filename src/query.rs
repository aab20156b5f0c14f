use crate::storage::{Fields, Predicate, Table, Value};

/// SQL query builder for constructing parameterized queries
/// Renders storage predicates into a WHERE clause with `$n` placeholders
pub struct SqlQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<Value>,
    order_clause: Option<String>,
}

/// Escapes LIKE wildcards so `Contains` matches the needle literally
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl SqlQueryBuilder {
    /// Starts a `SELECT *` over the given table
    pub fn select(table: Table) -> Self {
        Self::with_base(format!("SELECT * FROM {}", table.name()))
    }

    /// Starts a `SELECT COUNT(*)` over the given table
    pub fn count(table: Table) -> Self {
        Self::with_base(format!("SELECT COUNT(*) FROM {}", table.name()))
    }

    fn with_base(base_query: String) -> Self {
        Self {
            base_query,
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: None,
        }
    }

    fn push_param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn render(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::All => "TRUE".to_string(),
            Predicate::Eq(column, value) => {
                let placeholder = self.push_param(value.clone());
                format!("{} = {}", column, placeholder)
            }
            Predicate::Contains(column, needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                let placeholder = self.push_param(Value::Text(pattern));
                format!("{} LIKE {} ESCAPE '\\'", column, placeholder)
            }
            Predicate::AtLeast(column, value) => {
                let placeholder = self.push_param(value.clone());
                format!("{} >= {}", column, placeholder)
            }
            Predicate::AtMost(column, value) => {
                let placeholder = self.push_param(value.clone());
                format!("{} <= {}", column, placeholder)
            }
            Predicate::And(predicates) => self.render_group(predicates, " AND ", "TRUE"),
            Predicate::Or(predicates) => self.render_group(predicates, " OR ", "FALSE"),
        }
    }

    fn render_group(&mut self, predicates: &[Predicate], joiner: &str, empty: &str) -> String {
        if predicates.is_empty() {
            return empty.to_string();
        }
        let parts: Vec<String> = predicates.iter().map(|p| self.render(p)).collect();
        format!("({})", parts.join(joiner))
    }

    /// Adds a filter; `Predicate::All` adds nothing
    pub fn add_filter(&mut self, predicate: &Predicate) {
        if *predicate != Predicate::All {
            let clause = self.render(predicate);
            self.where_clauses.push(clause);
        }
    }

    /// Sorts descending on the given column
    pub fn order_desc(&mut self, column: &str) {
        self.order_clause = Some(format!("{} DESC", column));
    }

    /// Builds the final SQL query string with all parameters
    /// Returns a tuple of (query_string, parameters)
    pub fn build(self) -> (String, Vec<Value>) {
        let mut query = self.base_query;

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(&order);
        }

        (query, self.params)
    }
}

/// `INSERT INTO table (a, b) VALUES ($1, $2)`
pub fn insert_statement(table: Table, fields: &Fields) -> (String, Vec<Value>) {
    let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
    let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("${}", i)).collect();
    let query = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name(),
        columns.join(", "),
        placeholders.join(", ")
    );
    (query, fields.iter().map(|(_, value)| value.clone()).collect())
}

/// `UPDATE table SET a = $1, b = $2 WHERE pk = $3`
pub fn update_statement(table: Table, id: i64, fields: &Fields) -> (String, Vec<Value>) {
    let assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
        .collect();
    let query = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        table.name(),
        assignments.join(", "),
        table.primary_key(),
        fields.len() + 1
    );
    let mut params: Vec<Value> = fields.iter().map(|(_, value)| value.clone()).collect();
    params.push(Value::Int(id));
    (query, params)
}
