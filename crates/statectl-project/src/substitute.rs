//! `${NAME}` parameter substitution.

use std::collections::BTreeMap;

/// Replace every `${NAME}` in `content` whose `NAME` is in `parameters`.
///
/// Placeholders without a matching parameter, and an unterminated `${`, are
/// left verbatim. Substituted values are not scanned again.
pub fn substitute(content: &str, parameters: &BTreeMap<String, String>) -> String {
    if parameters.is_empty() {
        return content.to_string();
    }

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        // A nested opener starts the placeholder: `${VAR:-${DEFAULT}}`.
        if let Some(inner) = name.rfind("${") {
            out.push_str(&rest[start..start + 2 + inner]);
            rest = &after[inner..];
            continue;
        }
        match parameters.get(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_known_placeholders() {
        let out = substitute(
            "image: app:${VERSION}\nreplicas: ${REPLICAS}\n",
            &params(&[("VERSION", "1.0"), ("REPLICAS", "3")]),
        );
        assert_eq!(out, "image: app:1.0\nreplicas: 3\n");
    }

    #[test]
    fn replaces_every_occurrence() {
        let out = substitute("${A}-${A}", &params(&[("A", "x")]));
        assert_eq!(out, "x-x");
    }

    #[test]
    fn unknown_placeholder_left_verbatim() {
        let out = substitute("a ${MISSING} b ${A}", &params(&[("A", "1")]));
        assert_eq!(out, "a ${MISSING} b 1");
    }

    #[test]
    fn unterminated_placeholder_left_verbatim() {
        let out = substitute("x ${A} ${B", &params(&[("A", "1"), ("B", "2")]));
        assert_eq!(out, "x 1 ${B");
    }

    #[test]
    fn values_not_rescanned() {
        let out = substitute("${A}", &params(&[("A", "${B}"), ("B", "no")]));
        assert_eq!(out, "${B}");
    }

    #[test]
    fn nested_placeholder_replaced() {
        let out = substitute("value: ${VAR:-${DEFAULT}}\n", &params(&[("DEFAULT", "v2")]));
        assert_eq!(out, "value: ${VAR:-v2}\n");
    }

    #[test]
    fn unbalanced_opener_does_not_hide_placeholder() {
        let out = substitute("a ${ b ${A} ${${B}}", &params(&[("A", "1"), ("B", "2")]));
        assert_eq!(out, "a ${ b 1 ${2}");
    }

    #[test]
    fn no_parameters_is_identity() {
        let content = "plain ${TEXT} $ {} $";
        assert_eq!(substitute(content, &BTreeMap::new()), content);
    }

    #[test]
    fn bare_dollar_untouched() {
        let out = substitute("cost: $5 ${A}$", &params(&[("A", "x")]));
        assert_eq!(out, "cost: $5 x$");
    }
}
