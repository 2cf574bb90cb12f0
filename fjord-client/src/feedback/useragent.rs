// Product version inference from the user agent.

/// Gecko release to Firefox OS release. Keep in step with the server's browser version map.
const GECKO_TO_FXOS: &[(&str, &str)] = &[
    ("18.0", "1.0"),
    ("18.1", "1.1"),
    ("26.0", "1.2"),
    ("28.0", "1.3"),
];

/// Infer the Firefox OS version from a `Gecko/<version>` token.
///
/// Returns `None` when the UA has no Gecko token, the mapped FxOS version when known, and
/// `Gecko/<version>` otherwise.
pub fn infer_fxos_version(user_agent: &str) -> Option<String> {
    let start = user_agent.find("Gecko/")? + "Gecko/".len();
    let gecko: String = user_agent[start..]
        .chars()
        .take_while(|c| !c.is_whitespace())
        .collect();
    if gecko.is_empty() {
        return None;
    }

    Some(
        GECKO_TO_FXOS
            .iter()
            .find(|(g, _)| *g == gecko)
            .map(|(_, fxos)| fxos.to_string())
            .unwrap_or_else(|| format!("Gecko/{}", gecko)),
    )
}
