//! Naive CSV conversion for backend dumps.
//!
//! The first line holds the header names; every following line is zipped
//! positionally into a record keyed by header. Quoted fields and embedded
//! commas are not supported.

use std::collections::BTreeMap;

/// One converted CSV row keyed by header name.
pub type CsvRecord = BTreeMap<String, String>;

/// Converts CSV text into header-keyed records.
///
/// Missing trailing values default to an empty string and surplus values are
/// dropped.
#[must_use]
pub fn csv_to_records(text: &str) -> Vec<CsvRecord> {
    let mut lines = text.trim().split('\n');
    let Some(header_line) = lines.next().filter(|line| !line.trim().is_empty()) else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    lines
        .map(|line| {
            let mut values = line.split(',').map(str::trim);
            headers
                .iter()
                .map(|header| {
                    let value = values.next().unwrap_or_default();
                    ((*header).to_string(), value.to_string())
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_trailing_fields_default_to_empty() {
        let records = csv_to_records("a,b,c\n1,2");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["a"], "1");
        assert_eq!(records[0]["b"], "2");
        assert_eq!(records[0]["c"], "");
    }

    #[test]
    fn headers_and_values_are_trimmed() {
        let records = csv_to_records(" title , title__en ,type\r\nElma, Apple ,saha\r\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "Elma");
        assert_eq!(records[0]["title__en"], "Apple");
        assert_eq!(records[0]["type"], "saha");
    }

    #[test]
    fn surplus_values_are_dropped() {
        let records = csv_to_records("a\n1,2,3");
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0]["a"], "1");
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(csv_to_records("").is_empty());
        assert!(csv_to_records("  \n ").is_empty());
        assert!(csv_to_records("a,b").is_empty());
    }

    #[test]
    fn quoted_commas_are_split_naively() {
        let records = csv_to_records("title,type\n\"Ankara, Merkez\",ilce");
        assert_eq!(records[0]["title"], "\"Ankara");
        assert_eq!(records[0]["type"], "Merkez\"");
    }

    #[test]
    fn records_survive_json_reserialization() {
        let records = csv_to_records("id,title,type\n1,Satis,bolum\n2,Almanca,dil\n3");
        let json = serde_json::to_string(&records).expect("records serialize");
        let parsed: Vec<CsvRecord> = serde_json::from_str(&json).expect("records parse");
        assert_eq!(parsed, records);
    }
}
