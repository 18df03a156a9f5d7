//! Inline `style` attribute helpers

/// Split a `style` attribute into `(property, value)` declarations
///
/// Property names are lowercased; empty or malformed declarations are skipped.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            Some((property, value.to_string()))
        })
        .collect()
}

pub fn serialize_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(property, value)| format!("{property}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Value of the last `property` declaration in `style`
pub fn declaration(style: &str, property: &str) -> Option<String> {
    parse_declarations(style)
        .into_iter()
        .rev()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
        .map(|(_, value)| value)
}
