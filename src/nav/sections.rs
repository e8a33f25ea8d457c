// Section configuration.
// Static metadata, tab groups and routes for the single-page navigation model.

use std::collections::HashMap;

/// Identifier of the section shown when nothing else matches.
pub const HOME_SECTION: &str = "home";

/// Transition direction, which picks the slide animation pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Static metadata for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMeta {
    pub id: String,
    /// Primary tab group this section belongs to.
    pub primary: String,
    pub level: u32,
    /// Ordering among siblings.
    pub order: u32,
    pub parent: Option<String>,
    pub title: String,
    pub route: String,
    /// Static body text; the home section draws the repository feed instead.
    pub body: Vec<String>,
}

/// A primary tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryGroup {
    pub key: String,
    pub title: String,
    pub order: u32,
    /// Section a click on this tab opens.
    pub landing: String,
}

/// A secondary tab, shown only while its parent group is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryTab {
    pub parent: String,
    pub target: String,
    pub title: String,
}

/// All sections, tabs and routes.
#[derive(Debug, Clone)]
pub struct SectionConfig {
    sections: Vec<SectionMeta>,
    primaries: Vec<PrimaryGroup>,
    secondaries: Vec<SecondaryTab>,
    path_map: HashMap<String, String>,
}

/// Strip trailing slashes; an empty path is the root.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

impl SectionConfig {
    /// Build a config. Every section must have a distinct route, and a `home` section must exist.
    pub fn new(
        sections: Vec<SectionMeta>,
        primaries: Vec<PrimaryGroup>,
        secondaries: Vec<SecondaryTab>,
    ) -> Result<Self, String> {
        if !sections.iter().any(|s| s.id == HOME_SECTION) {
            return Err(format!("missing `{}` section", HOME_SECTION));
        }

        let mut path_map = HashMap::new();
        for section in &sections {
            let path = normalize_path(&section.route);
            if let Some(other) = path_map.insert(path.clone(), section.id.clone()) {
                return Err(format!(
                    "sections `{}` and `{}` share route {}",
                    other, section.id, path
                ));
            }
        }

        for primary in &primaries {
            if !sections.iter().any(|s| s.id == primary.landing) {
                return Err(format!(
                    "tab `{}` lands on unknown section `{}`",
                    primary.key, primary.landing
                ));
            }
        }

        Ok(Self {
            sections,
            primaries,
            secondaries,
            path_map,
        })
    }

    pub fn sections(&self) -> &[SectionMeta] {
        &self.sections
    }

    pub fn primaries(&self) -> &[PrimaryGroup] {
        &self.primaries
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s.id == id)
    }

    /// Metadata for `id`, falling back to the home section.
    pub fn meta(&self, id: &str) -> &SectionMeta {
        self.sections
            .iter()
            .find(|s| s.id == id)
            .or_else(|| self.sections.iter().find(|s| s.id == HOME_SECTION))
            .unwrap_or(&self.sections[0])
    }

    pub fn primary(&self, key: &str) -> Option<&PrimaryGroup> {
        self.primaries.iter().find(|p| p.key == key)
    }

    fn primary_order(&self, key: &str) -> Option<u32> {
        self.primary(key).map(|p| p.order)
    }

    /// Secondary tabs belonging to a primary group.
    pub fn secondaries_of(&self, primary: &str) -> Vec<&SecondaryTab> {
        self.secondaries
            .iter()
            .filter(|t| t.parent == primary)
            .collect()
    }

    /// Normalized path for a section; unknown sections map to the home route.
    pub fn route_for(&self, id: &str) -> String {
        normalize_path(&self.meta(id).route)
    }

    /// Section for a path; unknown paths map to home.
    pub fn section_for_path(&self, path: &str) -> String {
        self.path_map
            .get(&normalize_path(path))
            .cloned()
            .unwrap_or_else(|| HOME_SECTION.to_string())
    }

    /// Direction of a move between two sections.
    ///
    /// Parent/child moves decide first, then nesting level, then primary
    /// group order, then sibling order. Ties go forward.
    pub fn direction(&self, from: &str, to: &str) -> Direction {
        use Direction::*;

        if from == to {
            return Forward;
        }
        let from_meta = self.meta(from);
        let to_meta = self.meta(to);

        if to_meta.parent.as_deref() == Some(from) {
            return Forward;
        }
        if from_meta.parent.as_deref() == Some(to) {
            return Backward;
        }

        if to_meta.level != from_meta.level {
            return if to_meta.level > from_meta.level {
                Forward
            } else {
                Backward
            };
        }

        if to_meta.primary != from_meta.primary {
            let from_order = self.primary_order(&from_meta.primary).unwrap_or(0);
            let to_order = self.primary_order(&to_meta.primary).unwrap_or(from_order);
            return if to_order >= from_order {
                Forward
            } else {
                Backward
            };
        }

        if to_meta.order >= from_meta.order {
            Forward
        } else {
            Backward
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn section(
    id: &str,
    primary: &str,
    level: u32,
    order: u32,
    parent: Option<&str>,
    title: &str,
    route: &str,
    body: &[&str],
) -> SectionMeta {
    SectionMeta {
        id: id.to_string(),
        primary: primary.to_string(),
        level,
        order,
        parent: parent.map(str::to_string),
        title: title.to_string(),
        route: route.to_string(),
        body: body.iter().map(|l| l.to_string()).collect(),
    }
}

impl Default for SectionConfig {
    fn default() -> Self {
        let sections = vec![
            section(HOME_SECTION, "home", 0, 0, None, "home", "/", &[]),
            section(
                "osu-overview",
                "osu",
                1,
                0,
                None,
                "osu!",
                "/osu",
                &[
                    "osu! stuff lives here.",
                    "",
                    "skins: hand-made skins, tuned for readability at high AR.",
                    "tools: small utilities for replays, beatmaps and skins.",
                ],
            ),
            section(
                "osu-skins",
                "osu",
                2,
                0,
                Some("osu-overview"),
                "skins",
                "/osu/skins",
                &[
                    "skins",
                    "",
                    "minimal hitcircles, no approach-circle clutter.",
                    "every element has a @2x variant.",
                ],
            ),
            section(
                "osu-tools",
                "osu",
                2,
                1,
                Some("osu-overview"),
                "tools",
                "/osu/tools",
                &[
                    "tools",
                    "",
                    "scripts for batch-editing skin.ini and checking missing elements.",
                ],
            ),
        ];

        let primaries = vec![
            PrimaryGroup {
                key: "home".to_string(),
                title: "home".to_string(),
                order: 0,
                landing: HOME_SECTION.to_string(),
            },
            PrimaryGroup {
                key: "osu".to_string(),
                title: "osu!".to_string(),
                order: 1,
                landing: "osu-overview".to_string(),
            },
        ];

        let secondaries = [
            ("osu-overview", "overview"),
            ("osu-skins", "skins"),
            ("osu-tools", "tools"),
        ]
        .iter()
        .map(|(target, title)| SecondaryTab {
            parent: "osu".to_string(),
            target: target.to_string(),
            title: title.to_string(),
        })
        .collect();

        match Self::new(sections, primaries, secondaries) {
            Ok(config) => config,
            Err(e) => unreachable!("built-in section config is invalid: {}", e),
        }
    }
}
