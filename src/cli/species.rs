//! Species reference cards.

use serde::Serialize;

/// One reference card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeciesCard {
    /// Common name.
    pub name: &'static str,
    /// Scientific name or family shown as a badge.
    pub badge: &'static str,
    /// Short field note.
    pub fact: &'static str,
}

/// The static catalogue.
pub const SPECIES: [SpeciesCard; 6] = [
    SpeciesCard {
        name: "Monarch",
        badge: "Danaus plexippus",
        fact: "Vivid orange wings with bold black veins. Famous for multi-generation migrations from Canada to Mexico.",
    },
    SpeciesCard {
        name: "Viceroy",
        badge: "Limenitis archippus",
        fact: "Mimics monarchs but has an extra black line on the hindwings. Prefers wetlands and willow groves.",
    },
    SpeciesCard {
        name: "Swallowtail",
        badge: "Family Papilionidae",
        fact: "Large butterflies with tail-like extensions on hindwings. Often yellow-and-black banded.",
    },
    SpeciesCard {
        name: "Painted Lady",
        badge: "Vanessa cardui",
        fact: "Orange, brown, and white with eye spots. One of the most cosmopolitan butterfly species.",
    },
    SpeciesCard {
        name: "Blue Morpho",
        badge: "Morpho menelaus",
        fact: "Brilliant iridescent blue dorsal wings. Native to Central and South American rainforests.",
    },
    SpeciesCard {
        name: "Admiral",
        badge: "Vanessa atalanta",
        fact: "Dark wings with red-orange band and white spots. Highly territorial and quick flyers.",
    },
];

/// Card whose name matches a display label.
///
/// Exact matches win; otherwise a card matches when its name is the last word
/// or words of the label (`"Red Admiral"` finds `"Admiral"`).
pub fn find_card(label: &str) -> Option<&'static SpeciesCard> {
    let label = label.trim().to_lowercase();
    SPECIES
        .iter()
        .find(|card| card.name.to_lowercase() == label)
        .or_else(|| {
            SPECIES.iter().find(|card| {
                let name = card.name.to_lowercase();
                label
                    .strip_suffix(&name)
                    .is_some_and(|head| head.ends_with(' '))
            })
        })
}
