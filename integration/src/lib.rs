use std::io::{self, BufRead};

use momu::SkipList;

/// Only used for testing
pub fn key(i: usize) -> String {
  format!("{:05}", i)
}

/// Only used for testing
pub fn new_value(i: usize) -> String {
  format!("{:05}", i)
}

/// Splits a `key:value` line at the first `':'`.
///
/// Returns `None` for an empty line or a line without a separator. Everything
/// after the first separator, further `':'` included, belongs to the value.
pub fn split_line(line: &str) -> Option<(&str, &str)> {
  if line.is_empty() {
    return None;
  }
  line.split_once(':')
}

/// Counts of a [`load_lines`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
  /// Lines stored into the list.
  pub loaded: usize,
  /// Lines discarded because they had no separator.
  pub skipped: usize,
}

/// Feeds every valid `key:value` line of `reader` into `list`, later lines
/// overwriting earlier ones with the same key.
pub fn load_lines<R: BufRead>(reader: R, list: &SkipList<String, String>) -> io::Result<LoadStats> {
  let mut stats = LoadStats::default();
  for line in reader.lines() {
    let line = line?;
    match split_line(line.trim_end_matches('\r')) {
      Some((k, v)) => {
        list.put(k.to_string(), v.to_string());
        stats.loaded += 1;
      }
      None => stats.skipped += 1,
    }
  }
  Ok(stats)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_line() {
    assert_eq!(split_line("a:b"), Some(("a", "b")));
    assert_eq!(split_line("a:"), Some(("a", "")));
    assert_eq!(split_line(":b"), Some(("", "b")));
    assert_eq!(split_line("a:b:c"), Some(("a", "b:c")));
    assert_eq!(split_line("ab"), None);
    assert_eq!(split_line(""), None);
  }

  #[test]
  fn test_load_lines() {
    let input = "one:1\nbroken\ntwo:2\r\none:uno\n\n";
    let list = SkipList::new(8).unwrap();
    let stats = load_lines(input.as_bytes(), &list).unwrap();
    assert_eq!(stats, LoadStats { loaded: 3, skipped: 2 });
    assert_eq!(list.len(), 2);
    assert_eq!(list.get("one"), Some("uno".to_string()));
    assert_eq!(list.get("two"), Some("2".to_string()));
  }
}
