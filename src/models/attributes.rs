use std::fmt;
use std::string::FromUtf8Error;

/// Ordered key/value mapping of the attribute column (column 9)
///
/// GFF2 stores attributes as free text (`gene_id "X"; transcript_id "Y";`),
/// GFF3 as `key=value` pairs. `Attributes` keeps the input order of the keys,
/// so that re-encoded output looks like the input.
///
/// # Examples
///
/// ```rust
/// use gff2gff3::models::Attributes;
///
/// let (attrs, duplicates) = Attributes::from_gff2(r#"gene_id "g1"; transcript_id "t1";"#);
/// assert!(duplicates.is_empty());
/// assert_eq!(attrs.get("gene_id"), Some("g1"));
/// assert_eq!(attrs.to_gff3(), "gene_id=g1;transcript_id=t1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Inserts a value for `key`
    ///
    /// If the key is already present, the value is replaced in place (the key keeps
    /// its original position) and the old value is returned.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a GFF2 attribute column
    ///
    /// The column is split on `;` (semicolons inside double quotes do not count),
    /// then every segment is split on the first whitespace or `=` into key and value.
    /// Surrounding quotes are removed from the value.
    ///
    /// Returns the attributes and the keys that occurred more than once. For
    /// repeated keys, the last value wins.
    ///
    /// ```rust
    /// use gff2gff3::models::Attributes;
    ///
    /// let (attrs, duplicates) = Attributes::from_gff2(r#"note "a; b"; tag=x; tag=y"#);
    /// assert_eq!(attrs.get("note"), Some("a; b"));
    /// assert_eq!(attrs.get("tag"), Some("y"));
    /// assert_eq!(duplicates, vec!["tag".to_string()]);
    /// ```
    pub fn from_gff2(column: &str) -> (Self, Vec<String>) {
        let mut attributes = Attributes::new();
        let mut duplicates = vec![];
        for segment in split_unquoted(column, ';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = match segment.find(|c: char| c.is_whitespace() || c == '=') {
                Some(idx) => {
                    let (key, rest) = segment.split_at(idx);
                    let sep_len = rest.chars().next().map_or(0, |c| c.len_utf8());
                    (key, rest[sep_len..].trim())
                }
                None => (segment, ""),
            };
            if attributes.insert(key, unquote(value)).is_some() {
                duplicates.push(key.to_string());
            }
        }
        (attributes, duplicates)
    }

    /// Encodes the attributes as a GFF3 attribute column
    ///
    /// Reserved characters in keys and values are percent-encoded.
    ///
    /// ```rust
    /// use gff2gff3::models::Attributes;
    ///
    /// let mut attrs = Attributes::new();
    /// attrs.insert("note", "contains; semicolon");
    /// assert_eq!(attrs.to_gff3(), "note=contains%3B semicolon");
    /// ```
    pub fn to_gff3(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<String>>()
            .join(";")
    }

    /// Decodes a GFF3 attribute column, the inverse of [`to_gff3`](`Attributes::to_gff3`)
    pub fn from_gff3(column: &str) -> Result<Self, FromUtf8Error> {
        let mut attributes = Attributes::new();
        for pair in column.split(';') {
            if pair.is_empty() {
                continue;
            }
            let mut parts = pair.splitn(2, '=');
            let key = urlencoding::decode(parts.next().unwrap_or_default())?;
            let value = urlencoding::decode(parts.next().unwrap_or_default())?;
            attributes.insert(key.into_owned(), value.into_owned());
        }
        Ok(attributes)
    }
}

/// Renders the attributes in GFF2 notation, as found in the legacy input
impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.entries
                .iter()
                .map(|(k, v)| format!("{} \"{}\";", k, v))
                .collect::<Vec<String>>()
                .join(" ")
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

/// Percent-encodes the characters that have a special meaning in GFF3 column 9
/// and all ASCII control characters
pub fn encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            ';' | '=' | '%' | ',' | '&' => encoded.push_str(&format!("%{:02X}", c as u32)),
            c if c.is_ascii_control() => encoded.push_str(&format!("%{:02X}", c as u32)),
            c => encoded.push(c),
        }
    }
    encoded
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = vec![];
    let mut in_quotes = false;
    let mut last = 0;
    for (idx, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&s[last..idx]);
            last = idx + c.len_utf8();
        }
    }
    parts.push(&s[last..]);
    parts
}

fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

#[cfg(test)]
mod test_attributes {
    use super::*;

    #[test]
    fn test_gff2_quoted() {
        let (attrs, dup) = Attributes::from_gff2(r#"gene_id "g1"; transcript_id "t1";"#);
        assert!(dup.is_empty());
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("gene_id"), Some("g1"));
        assert_eq!(attrs.get("transcript_id"), Some("t1"));
    }

    #[test]
    fn test_gff2_unquoted_and_equals() {
        let (attrs, _) = Attributes::from_gff2("gene_id=g1;  note some free text ; flag");
        assert_eq!(attrs.get("gene_id"), Some("g1"));
        assert_eq!(attrs.get("note"), Some("some free text"));
        assert_eq!(attrs.get("flag"), Some(""));
    }

    #[test]
    fn test_gff2_keeps_order_and_unknown_keys() {
        let (attrs, _) = Attributes::from_gff2(r#"zeta "1"; alpha "2"; gene_id "g";"#);
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "gene_id"]);
    }

    #[test]
    fn test_gff2_semicolon_in_quotes() {
        let (attrs, _) = Attributes::from_gff2(r#"note "contains; semicolon"; gene_id "g1""#);
        assert_eq!(attrs.get("note"), Some("contains; semicolon"));
        assert_eq!(attrs.get("gene_id"), Some("g1"));
    }

    #[test]
    fn test_gff2_duplicates() {
        let (attrs, dup) = Attributes::from_gff2(r#"a "1"; b "2"; a "3";"#);
        assert_eq!(dup, vec!["a".to_string()]);
        assert_eq!(attrs.get("a"), Some("3"));
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_gff2_empty() {
        let (attrs, dup) = Attributes::from_gff2("");
        assert!(attrs.is_empty());
        assert!(dup.is_empty());
        let (attrs, _) = Attributes::from_gff2(" ; ;");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_encode_reserved() {
        assert_eq!(encode("a;b=c%d,e&f"), "a%3Bb%3Dc%25d%2Ce%26f");
        assert_eq!(encode("tab\there"), "tab%09here");
        assert_eq!(encode("line\nbreak\r"), "line%0Abreak%0D");
        assert_eq!(encode("plain text: ok"), "plain text: ok");
    }

    #[test]
    fn test_gff3_reencoding_is_stable() {
        let attrs: Attributes = vec![
            ("note", "contains; semicolon"),
            ("odd=key", "100%, sure"),
            ("multi", "line\nvalue\twith tab"),
            ("empty", ""),
        ]
        .into_iter()
        .collect();
        let encoded = attrs.to_gff3();
        assert!(!encoded.contains('\t'));
        assert_eq!(encoded.matches(';').count(), 3);
        assert_eq!(Attributes::from_gff3(&encoded).unwrap(), attrs);
    }

    #[test]
    fn test_remove() {
        let mut attrs: Attributes = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(attrs.remove("a"), Some("1".to_string()));
        assert_eq!(attrs.remove("a"), None);
        assert!(!attrs.contains_key("a"));
        assert_eq!(attrs.len(), 1);
    }
}
