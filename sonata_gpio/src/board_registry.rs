//! Board registry for GPIO board drivers.
//!
//! Provides a `BoardRegistry` struct for registering and creating GPIO
//! boards by name. Constructed at startup and passed by reference; there is
//! no global registry.

use sonata_common::gpio::board::{BoardFactory, GpioBoard, GpioError};
use sonata_common::gpio::config::GpioConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::boards::register_builtin_boards;

/// Registry of available board drivers.
pub struct BoardRegistry {
    factories: HashMap<&'static str, BoardFactory>,
}

impl BoardRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in board.
    pub fn with_builtin_boards() -> Self {
        let mut registry = Self::new();
        register_builtin_boards(&mut registry);
        registry
    }

    /// Register a board factory.
    ///
    /// # Panics
    /// Panics if a board with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: BoardFactory) {
        if self.factories.contains_key(name) {
            panic!("Board '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a board factory by name.
    pub fn get_factory(&self, name: &str) -> Option<BoardFactory> {
        self.factories.get(name).copied()
    }

    /// Create a board instance by name.
    ///
    /// # Errors
    /// Returns `GpioError::BoardNotFound` if no board with the given name is
    /// registered, or the factory's own error.
    pub fn create_board(
        &self,
        name: &str,
        config: &GpioConfig,
    ) -> Result<Arc<dyn GpioBoard>, GpioError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| GpioError::BoardNotFound(name.to_string()))?;
        let board = factory(config)?;
        info!(
            "Created board '{}' with {} LEDs, {} switches",
            board.name(),
            board.led_count(),
            board.switch_count()
        );
        Ok(board)
    }

    /// List all registered board names, sorted.
    pub fn list_boards(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for BoardRegistry {
    fn default() -> Self {
        Self::new()
    }
}
