/// Model id used when the host supplies none.
pub const DEFAULT_MODEL_ID: &str = "blue_mosque";

/// Heritage-site model families known to the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ModelCategory {
    BlueMosque,
    BatuCaves,
    MerdekaSquare,
    /// Anything that matches no keyword.
    Default,
}

impl ModelCategory {
    /// Resolves a free-form model id by case-sensitive substring match.
    ///
    /// Keywords are tried in a fixed order and the first match wins:
    /// `mosque`/`blue`, then `caves`/`batu`, then `square`/`merdeka`.
    pub fn resolve(model_id: &str) -> Self {
        const KEYWORDS: [(&[&str], ModelCategory); 3] = [
            (&["mosque", "blue"], ModelCategory::BlueMosque),
            (&["caves", "batu"], ModelCategory::BatuCaves),
            (&["square", "merdeka"], ModelCategory::MerdekaSquare),
        ];

        KEYWORDS
            .iter()
            .find(|(words, _)| words.iter().any(|w| model_id.contains(w)))
            .map_or(ModelCategory::Default, |&(_, category)| category)
    }

    /// Asset-store path of this category's model, if it has one.
    pub fn asset_path(self) -> Option<&'static str> {
        match self {
            ModelCategory::BlueMosque => Some("ar_assets/blue_mosque.glb"),
            ModelCategory::BatuCaves => Some("ar_assets/batu_caves.glb"),
            ModelCategory::MerdekaSquare => Some("ar_assets/merdeka_square.glb"),
            ModelCategory::Default => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelCategory::BlueMosque => "Blue Mosque Model",
            ModelCategory::BatuCaves => "Batu Caves Model",
            ModelCategory::MerdekaSquare => "Merdeka Square Model",
            ModelCategory::Default => "Heritage Site Model",
        }
    }

    /// Key under which resolved geometry is cached.
    pub(crate) fn cache_key(self) -> &'static str {
        self.asset_path().unwrap_or("builtin/default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_resolve_in_order() {
        assert_eq!(ModelCategory::resolve("blue_mosque"), ModelCategory::BlueMosque);
        assert_eq!(ModelCategory::resolve("batu_caves"), ModelCategory::BatuCaves);
        assert_eq!(ModelCategory::resolve("merdeka_square"), ModelCategory::MerdekaSquare);
        // Both families match; the earlier keyword group wins.
        assert_eq!(ModelCategory::resolve("blue_caves"), ModelCategory::BlueMosque);
    }

    #[test]
    fn unmatched_id_is_default() {
        assert_eq!(ModelCategory::resolve("petronas_towers"), ModelCategory::Default);
        assert_eq!(ModelCategory::resolve(""), ModelCategory::Default);
        assert_eq!(ModelCategory::resolve("MOSQUE"), ModelCategory::Default);
        assert_eq!(ModelCategory::Default.asset_path(), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(ModelCategory::resolve(DEFAULT_MODEL_ID).display_name(), "Blue Mosque Model");
        assert_eq!(ModelCategory::Default.display_name(), "Heritage Site Model");
    }
}
