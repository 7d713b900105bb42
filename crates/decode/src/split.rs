//! Splitting of multi-document YAML streams on `\n---`.

const SEPARATOR: &[u8] = b"\n---";

/// Lazy iterator over the documents of a YAML buffer. Documents are trimmed
/// and blank ones are skipped.
#[derive(Debug, Clone)]
pub struct YamlDocuments<'a> {
    buf: &'a [u8],
    pos: usize,
}

pub fn split_yaml_documents(buf: &[u8]) -> YamlDocuments<'_> {
    YamlDocuments { buf, pos: 0 }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn trim(mut b: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = b {
        if first.is_ascii_whitespace() {
            b = rest;
        } else {
            break;
        }
    }
    while let [rest @ .., last] = b {
        if last.is_ascii_whitespace() {
            b = rest;
        } else {
            break;
        }
    }
    b
}

impl<'a> YamlDocuments<'a> {
    /// Next raw token and the number of bytes it consumes. The whole buffer is
    /// available, so a separator lacking its trailing newline ends the scan
    /// with the remainder as the last document.
    fn next_token(&self) -> Option<(&'a [u8], usize)> {
        let data = &self.buf[self.pos..];
        if data.is_empty() {
            return None;
        }
        let Some(i) = find(data, SEPARATOR) else {
            return Some((data, data.len()));
        };
        let after = &data[i + SEPARATOR.len()..];
        if after.is_empty() {
            return Some((&data[..i], data.len()));
        }
        match after.iter().position(|b| *b == b'\n') {
            Some(j) => Some((&data[..i], i + SEPARATOR.len() + j + 1)),
            None => Some((data, data.len())),
        }
    }
}

impl<'a> Iterator for YamlDocuments<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (token, advance) = self.next_token()?;
            self.pos += advance;
            let doc = trim(token);
            if !doc.is_empty() {
                return Some(doc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(input: &str) -> Vec<&str> {
        split_yaml_documents(input.as_bytes()).map(|d| std::str::from_utf8(d).unwrap()).collect()
    }

    #[test]
    fn three_documents() {
        assert_eq!(docs("a: 1\n---\nb: 2\n---\nc: 3"), ["a: 1", "b: 2", "c: 3"]);
    }

    #[test]
    fn single_document_is_trimmed() {
        assert_eq!(docs("\n  name: x  \n\n"), ["name: x"]);
        assert!(docs("").is_empty());
        assert!(docs(" \n\t").is_empty());
    }

    #[test]
    fn stray_separators_are_dropped() {
        assert_eq!(docs("a: 1\n---\n\n---\nb: 2\n---"), ["a: 1", "b: 2"]);
        assert_eq!(docs("a: 1\n---"), ["a: 1"]);
    }

    #[test]
    fn leading_separator_stays_with_first_document() {
        assert_eq!(docs("---\na: 1\n---\nb: 2\n"), ["---\na: 1", "b: 2"]);
    }

    #[test]
    fn dashes_inside_a_line_do_not_split() {
        assert_eq!(docs("key: a---b\nother: ---\n"), ["key: a---b\nother: ---"]);
    }

    #[test]
    fn separator_without_newline_at_end_keeps_remainder() {
        assert_eq!(docs("a: 1\n--- # end"), ["a: 1\n--- # end"]);
    }

    #[test]
    fn separator_with_trailing_comment() {
        assert_eq!(docs("a: 1\n--- # next\nb: 2\n"), ["a: 1", "b: 2"]);
    }
}
