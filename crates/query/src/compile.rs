//! Flattens clause state into statement text.
//!
//! Every statement shape has a fixed sequence of clause slots. Slots that are
//! unset are skipped, the rest are joined with single spaces, and the result
//! has all whitespace runs collapsed and is trimmed. Equality of compiled
//! strings is therefore stable regardless of how a clause was spelled.

use crate::table::{Clauses, Partition};
use tabula_core::Result;

/// Assembles one statement from clause slots in order.
pub(crate) struct Statement {
    parts: Vec<String>,
}

impl Statement {
    pub fn new(keyword: &str) -> Self {
        Self {
            parts: vec![keyword.to_string()],
        }
    }

    pub fn push(mut self, part: impl Into<String>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn push_opt(self, part: Option<String>) -> Self {
        match part {
            Some(p) => self.push(p),
            None => self,
        }
    }

    pub fn finish(self) -> String {
        normalize_whitespace(&self.parts.join(" "))
    }
}

/// Collapses every whitespace run to one space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replaces the first ASCII-case-insensitive occurrence of `keyword`.
///
/// Returns the input unchanged when `keyword` does not occur.
pub fn replace_first_keyword(text: &str, keyword: &str, replacement: &str) -> String {
    match find_ignore_case(text, keyword) {
        Some(pos) => {
            let mut out = String::with_capacity(text.len() + replacement.len());
            out.push_str(&text[..pos]);
            out.push_str(replacement);
            out.push_str(&text[pos + keyword.len()..]);
            out
        }
        None => text.to_string(),
    }
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
pub(crate) fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets, so positions map back 1:1.
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

pub(crate) fn where_clause(filters: &[String]) -> Option<String> {
    if filters.is_empty() {
        None
    } else {
        Some(format!("where {}", filters.join(" and ")))
    }
}

fn partition_clause(partition: &Partition) -> Option<String> {
    match partition {
        Partition::None => None,
        Partition::GroupBy(keys) => Some(format!("group by {}", keys.join(","))),
        Partition::ContextBy(keys) => Some(format!("context by {}", keys.join(","))),
    }
}

fn context_by_clause(keys: Option<&[String]>) -> Option<String> {
    keys.filter(|k| !k.is_empty())
        .map(|k| format!("context by {}", k.join(",")))
}

fn having_clause(having: Option<&str>) -> Option<String> {
    having.map(|h| format!("having {}", h))
}

fn order_clause(sort: &[String]) -> Option<String> {
    if sort.is_empty() {
        None
    } else {
        Some(format!("order by {}", sort.join(",")))
    }
}

/// `select [top N] <list> from <source> [where] [group|context by] [having] [order by]`
pub(crate) fn compile_select(source: &str, clauses: &Clauses) -> Result<String> {
    Ok(Statement::new("select")
        .push_opt(clauses.top.map(|n| format!("top {}", n)))
        .push(clauses.select.render()?)
        .push(format!("from {}", source))
        .push_opt(where_clause(&clauses.filters))
        .push_opt(partition_clause(&clauses.partition))
        .push_opt(having_clause(clauses.having.as_deref()))
        .push_opt(order_clause(&clauses.sort))
        .finish())
}

/// Inputs of an `update` statement.
pub(crate) struct UpdateParts<'a> {
    pub target: &'a str,
    pub assignments: &'a [(String, String)],
    /// Join expression the update reads from, for update-through-join.
    pub from: Option<&'a str>,
    pub filters: &'a [String],
    pub context_by: Option<&'a [String]>,
    pub having: Option<&'a str>,
}

/// `update <target> set c=v,... [from <join>] [where] [context by] [having]`
pub(crate) fn compile_update(parts: &UpdateParts<'_>) -> String {
    let set = parts
        .assignments
        .iter()
        .map(|(col, val)| format!("{}={}", col, val))
        .collect::<Vec<_>>()
        .join(",");
    Statement::new("update")
        .push(parts.target)
        .push(format!("set {}", set))
        .push_opt(parts.from.map(|f| format!("from {}", f)))
        .push_opt(where_clause(parts.filters))
        .push_opt(context_by_clause(parts.context_by))
        .push_opt(having_clause(parts.having))
        .finish()
}

/// `delete from <target> [where]`
pub(crate) fn compile_delete(target: &str, filters: &[String]) -> String {
    Statement::new("delete")
        .push(format!("from {}", target))
        .push_opt(where_clause(filters))
        .finish()
}

/// `select <value expr> from <source> [where] pivot by <row>,<column>`
pub(crate) fn compile_pivot(
    value: &str,
    source: &str,
    filters: &[String],
    row: &str,
    column: &str,
) -> String {
    Statement::new("select")
        .push(value)
        .push(format!("from {}", source))
        .push_opt(where_clause(filters))
        .push(format!("pivot by {},{}", row, column))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Selection;

    fn clauses(cols: &[&str]) -> Clauses {
        Clauses::new(Selection::Columns(cols.iter().map(|c| c.to_string()).collect()))
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  select  a \t from\n t  "), "select a from t");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_replace_first_keyword() {
        assert_eq!(
            replace_first_keyword("select top 5 a from t", "select", "exec"),
            "exec top 5 a from t"
        );
        assert_eq!(
            replace_first_keyword("SELECT a from (select b from t)", "select", "exec"),
            "exec a from (select b from t)"
        );
        assert_eq!(replace_first_keyword("update t set a=1", "select", "exec"), "update t set a=1");
    }

    #[test]
    fn test_compile_select_all_slots() {
        let mut c = clauses(&["sym", "sum(qty)"]);
        c.top = Some(10);
        c.filters = vec!["price>10".into(), "qty<5".into()];
        c.partition = Partition::GroupBy(vec!["sym".into()]);
        c.having = Some("sum(qty)>100".into());
        c.sort = vec!["sym".into()];

        assert_eq!(
            compile_select("trades", &c).unwrap(),
            "select top 10 sym,sum(qty) from trades where price>10 and qty<5 group by sym having sum(qty)>100 order by sym"
        );
    }

    #[test]
    fn test_compile_select_minimal() {
        let c = Clauses::new(Selection::All);
        assert_eq!(compile_select("t", &c).unwrap(), "select * from t");
    }

    #[test]
    fn test_compile_select_context_by() {
        let mut c = clauses(&["sym", "cumsum(qty)"]);
        c.partition = Partition::ContextBy(vec!["sym".into(), "date".into()]);
        assert_eq!(
            compile_select("t", &c).unwrap(),
            "select sym,cumsum(qty) from t context by sym,date"
        );
    }

    #[test]
    fn test_compile_update() {
        let assignments = vec![("price".to_string(), "price*2".to_string()), ("flag".into(), "1".into())];
        let filters = vec!["sym=`IBM".to_string()];
        let keys = vec!["sym".to_string()];
        let sql = compile_update(&UpdateParts {
            target: "t",
            assignments: &assignments,
            from: None,
            filters: &filters,
            context_by: Some(&keys),
            having: Some("sum(qty)>1"),
        });
        assert_eq!(
            sql,
            "update t set price=price*2,flag=1 where sym=`IBM context by sym having sum(qty)>1"
        );
    }

    #[test]
    fn test_compile_delete() {
        assert_eq!(compile_delete("t", &[]), "delete from t");
        assert_eq!(compile_delete("t", &["x>1".into()]), "delete from t where x>1");
    }

    #[test]
    fn test_compile_pivot() {
        assert_eq!(
            compile_pivot("sum(qty)", "t", &[], "date", "sym"),
            "select sum(qty) from t pivot by date,sym"
        );
    }
}
