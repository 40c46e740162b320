//! World catalog: built-in settings plus operator-supplied YAML.

use sagaforge_core::error::DomainError;
use serde::Deserialize;
use tracing::info;

use super::world::World;

/// YAML document shape: `worlds: [ ... ]`.
#[derive(Debug, Deserialize)]
struct WorldFile {
    worlds: Vec<World>,
}

/// Ordered collection of selectable worlds, unique by `id`.
#[derive(Debug, Clone, Default)]
pub struct WorldCatalog {
    worlds: Vec<World>,
}

impl WorldCatalog {
    /// The settings shipped with the engine.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            worlds: vec![
                World {
                    id: "emberwood".to_owned(),
                    name: "Emberwood".to_owned(),
                    description: "An ancient forest where the trees smoulder but never burn, \
                                  ruled by wary druids and hunted by ash wolves."
                        .to_owned(),
                    tone: vec!["dark fantasy".to_owned(), "folk tale".to_owned()],
                    constraints: vec!["no graphic gore".to_owned()],
                },
                World {
                    id: "saltmarsh-isles".to_owned(),
                    name: "Saltmarsh Isles".to_owned(),
                    description: "A chain of fog-bound islands full of smugglers' coves, \
                                  drowned temples and feuding merchant houses."
                        .to_owned(),
                    tone: vec!["swashbuckling".to_owned(), "mystery".to_owned()],
                    constraints: vec!["keep it PG-13".to_owned()],
                },
                World {
                    id: "clockwork-city".to_owned(),
                    name: "The Clockwork City".to_owned(),
                    description: "A vertical city of brass towers where guild automatons keep \
                                  order and the undercity keeps secrets."
                        .to_owned(),
                    tone: vec!["steampunk".to_owned(), "intrigue".to_owned()],
                    constraints: vec!["no real-world politics".to_owned()],
                },
            ],
        }
    }

    /// Parses a YAML document of the form `worlds: [...]`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the document does not parse, a
    /// world has a blank id or name, or two worlds share an id.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        let file: WorldFile = serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::Validation(format!("invalid world file: {e}")))?;
        let mut catalog = Self::default();
        for world in file.worlds {
            catalog.insert(world)?;
        }
        Ok(catalog)
    }

    /// Adds every world of `other`, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` on a duplicate id.
    pub fn extend(&mut self, other: Self) -> Result<(), DomainError> {
        for world in other.worlds {
            self.insert(world)?;
        }
        Ok(())
    }

    fn insert(&mut self, world: World) -> Result<(), DomainError> {
        if world.id.trim().is_empty() || world.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "world id and name must not be blank".to_owned(),
            ));
        }
        if self.get(&world.id).is_some() {
            return Err(DomainError::Validation(format!(
                "duplicate world id: {}",
                world.id
            )));
        }
        info!(world_id = %world.id, "world registered");
        self.worlds.push(world);
        Ok(())
    }

    /// Looks a world up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&World> {
        self.worlds.iter().find(|w| w.id == id)
    }

    /// Returns the world or a `WorldNotFound` error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::WorldNotFound` if no world has this id.
    pub fn require(&self, id: &str) -> Result<&World, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::WorldNotFound(id.to_owned()))
    }

    /// All worlds in registration order.
    #[must_use]
    pub fn worlds(&self) -> &[World] {
        &self.worlds
    }
}
