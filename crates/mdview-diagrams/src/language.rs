//! Diagram languages and output formats understood by Kroki.
//!
//! A server instance renders one designated language, picked in configuration
//! by the fence label it should intercept (`mermaid` by default).

/// Diagram language, identified by its fence label and Kroki endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagramLanguage {
    #[default]
    Mermaid,
    PlantUml,
    GraphViz,
    D2,
    Ditaa,
    Svgbob,
    Nomnoml,
    WaveDrom,
}

const LABELS: &[(&str, DiagramLanguage)] = &[
    ("mermaid", DiagramLanguage::Mermaid),
    ("plantuml", DiagramLanguage::PlantUml),
    ("graphviz", DiagramLanguage::GraphViz),
    ("dot", DiagramLanguage::GraphViz),
    ("d2", DiagramLanguage::D2),
    ("ditaa", DiagramLanguage::Ditaa),
    ("svgbob", DiagramLanguage::Svgbob),
    ("nomnoml", DiagramLanguage::Nomnoml),
    ("wavedrom", DiagramLanguage::WaveDrom),
];

impl DiagramLanguage {
    /// Look up a language by fence label.
    ///
    /// Matching is exact and case-sensitive. A `kroki-` prefix is accepted so
    /// that `kroki-mermaid` fences written for other tools also render.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.strip_prefix("kroki-").unwrap_or(label);
        LABELS
            .iter()
            .find_map(|&(name, language)| (name == label).then_some(language))
    }

    /// Path segment of the Kroki endpoint for this language.
    #[must_use]
    pub fn kroki_endpoint(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::PlantUml => "plantuml",
            Self::GraphViz => "graphviz",
            Self::D2 => "d2",
            Self::Ditaa => "ditaa",
            Self::Svgbob => "svgbob",
            Self::Nomnoml => "nomnoml",
            Self::WaveDrom => "wavedrom",
        }
    }

    /// Whether a fence label selects this language.
    #[must_use]
    pub fn matches(self, label: &str) -> bool {
        Self::parse(label) == Some(self)
    }
}

/// Image format requested from Kroki.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramFormat {
    /// Vector image, embedded as `image/svg+xml`.
    #[default]
    Svg,
    /// Raster image, embedded as `image/png`.
    Png,
}

impl DiagramFormat {
    /// Parse format from configuration value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Return format as string representation (also the Kroki path segment).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// MIME type used in the `data:` URI.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
        }
    }
}
