// ---------------------------------------------------------------------------
// Brazilian state codes → full names
// ---------------------------------------------------------------------------

/// Closed lookup of the 27 federative units, sorted by code.
pub const REGIONS: [(&str, &str); 27] = [
    ("AC", "Acre"),
    ("AL", "Alagoas"),
    ("AM", "Amazonas"),
    ("AP", "Amapá"),
    ("BA", "Bahia"),
    ("CE", "Ceará"),
    ("DF", "Distrito Federal"),
    ("ES", "Espírito Santo"),
    ("GO", "Goiás"),
    ("MA", "Maranhão"),
    ("MG", "Minas Gerais"),
    ("MS", "Mato Grosso do Sul"),
    ("MT", "Mato Grosso"),
    ("PA", "Pará"),
    ("PB", "Paraíba"),
    ("PE", "Pernambuco"),
    ("PI", "Piauí"),
    ("PR", "Paraná"),
    ("RJ", "Rio de Janeiro"),
    ("RN", "Rio Grande do Norte"),
    ("RO", "Rondônia"),
    ("RR", "Roraima"),
    ("RS", "Rio Grande do Sul"),
    ("SC", "Santa Catarina"),
    ("SE", "Sergipe"),
    ("SP", "São Paulo"),
    ("TO", "Tocantins"),
];

/// A region as it appears in the loaded table. `None` marks a code that is
/// not part of [`REGIONS`].
pub type Region = Option<&'static str>;

/// Label shown wherever an undefined region has to be rendered.
pub const UNDEFINED_REGION_LABEL: &str = "(tidak diketahui)";

/// Translate a two-letter code into its full name.
///
/// Codes are trimmed and compared case-insensitively. Unknown codes yield
/// `None` instead of an error so a bad row never aborts a load.
pub fn region_name(code: &str) -> Region {
    let code = code.trim().to_ascii_uppercase();
    REGIONS
        .binary_search_by(|(c, _)| c.cmp(&code.as_str()))
        .ok()
        .map(|i| REGIONS[i].1)
}

/// Reverse lookup, used by the UI to show the short code next to a name.
pub fn region_code(name: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(c, _)| *c)
}

/// Display label for a [`Region`].
pub fn region_label(region: Region) -> &'static str {
    region.unwrap_or(UNDEFINED_REGION_LABEL)
}
