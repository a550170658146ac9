//! Configuration for octrees and cullers

use crate::error::{Error, Result};

/// Default half-extent of the root cell, in world units
pub const DEFAULT_REGION_SIZE: f32 = 1000.0;

/// Default maximum subdivision depth below the root cell
pub const DEFAULT_MAX_DEPTH: u32 = 24;

/// Octree construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcTreeConfig {
    /// Half-extent of the root cell. The root covers
    /// `[-region_size, region_size]` on every axis.
    pub region_size: f32,
    /// Maximum number of halvings of the root cell. Positions that cannot
    /// be told apart at this depth are refused (or packed, for buckets).
    pub max_depth: u32,
}

impl Default for OcTreeConfig {
    fn default() -> Self {
        Self {
            region_size: DEFAULT_REGION_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl OcTreeConfig {
    /// Config with the given region size and the default depth limit
    pub fn with_region_size(region_size: f32) -> Self {
        Self {
            region_size,
            ..Self::default()
        }
    }

    /// Check the parameters before building a tree
    pub fn validate(&self) -> Result<()> {
        if !self.region_size.is_finite() || self.region_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "region size must be a positive finite number, got {}",
                self.region_size
            )));
        }
        if self.max_depth == 0 {
            return Err(Error::InvalidConfig(
                "max depth must be at least 1".to_string(),
            ));
        }
        // f32 halving stops producing distinct cell centers well before 128
        if self.max_depth > 126 {
            return Err(Error::InvalidConfig(format!(
                "max depth {} exceeds the f32 subdivision range",
                self.max_depth
            )));
        }
        Ok(())
    }
}

/// `OcTreeCuller` / `DummyCuller` construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullerConfig {
    /// Spatial index parameters (ignored by `DummyCuller`)
    pub octree: OcTreeConfig,
    /// Initial capacity of the visible element list
    pub element_reserve: usize,
    /// Initial capacity of the visible light list
    pub light_reserve: usize,
}

impl Default for CullerConfig {
    fn default() -> Self {
        Self {
            octree: OcTreeConfig::default(),
            element_reserve: 64,
            light_reserve: 8,
        }
    }
}

impl CullerConfig {
    pub fn validate(&self) -> Result<()> {
        self.octree.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CullerConfig::default();
        assert_eq!(config.octree.region_size, 1000.0);
        assert_eq!(config.octree.max_depth, 24);
        assert_eq!(config.element_reserve, 64);
        assert_eq!(config.light_reserve, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_region_size() {
        let config = OcTreeConfig::with_region_size(100.0);
        assert_eq!(config.region_size, 100.0);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_invalid_region_size() {
        for size in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let result = OcTreeConfig::with_region_size(size).validate();
            assert!(matches!(result, Err(Error::InvalidConfig(_))), "size {}", size);
        }
    }

    #[test]
    fn test_invalid_depth() {
        let zero = OcTreeConfig { region_size: 10.0, max_depth: 0 };
        assert!(zero.validate().is_err());
        let huge = OcTreeConfig { region_size: 10.0, max_depth: 200 };
        assert!(huge.validate().is_err());
    }
}
