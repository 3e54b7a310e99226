//! `{var}` placeholder expansion for package patterns and link names.

use anyhow::{Result, bail};

/// Replace every `{key}` in `template` with its value from `vars`.
///
/// Unknown keys and unbalanced braces are errors so a typo in a layout never
/// turns into a literal `{cuda}` package lookup.
pub fn expand(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            bail!("Unclosed '{{' in template '{}'", template);
        };
        let key = &after[..close];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => bail!("Unknown variable '{{{}}}' in template '{}'", key, template),
        }
        rest = &after[close + 1..];
    }

    if rest.contains('}') {
        bail!("Unmatched '}}' in template '{}'", template);
    }
    out.push_str(rest);
    Ok(out)
}
