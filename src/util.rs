//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s.char_indices().take_while(|(i, _)| *i <= max).last().map(|(i, _)| i).unwrap_or(0);
    format!("{}... ({} bytes total)", &s[..cut], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_replaces_all_occurrences() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y and x");
  }

  #[test]
  fn template_leaves_unknown_keys_alone() {
    assert_eq!(fill_template("{missing}", &[("a", "x")]), "{missing}");
  }

  #[test]
  fn truncation_keeps_short_strings_intact() {
    assert_eq!(trunc_for_log("short", 10), "short");
  }

  #[test]
  fn truncation_reports_total_size() {
    let out = trunc_for_log(&"x".repeat(100), 10);
    assert!(out.contains("(100 bytes total)"));
    assert!(out.starts_with("xxxxxxxxxx"));
  }
}
