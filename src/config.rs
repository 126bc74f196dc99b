/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone)]
pub struct Config {
    pub building: BuildingConfig,
    pub dispatch: DispatchConfig,
}

/// Immutable building description. Floors are numbered `0..n_floors`.
#[derive(Deserialize, Clone)]
pub struct BuildingConfig {
    pub n_floors: u8,
    pub n_cars: u8,
    pub capacity: u8,
}

impl BuildingConfig {
    /// Home floor for car `index`: cars rest evenly spread over the
    /// building so no call starts far from every car.
    pub fn home_floor(&self, index: u8) -> u8 {
        if self.n_cars <= 1 {
            return self.n_floors / 2;
        }
        let segment = self.n_floors as u32;
        let home = (index as u32 * segment + segment / 2) / self.n_cars as u32;
        (home as u8).min(self.n_floors.saturating_sub(1))
    }
}

#[derive(Deserialize, Clone)]
pub struct DispatchConfig {
    /// Cost added when serving a call requires a direction reversal or a
    /// start from idle. Tunable policy weight.
    pub reversal_penalty: u32,
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config(path: &str) -> Config {
    let config_str = fs::read_to_string(path).expect("Failed to read configuration file");
    toml::from_str(&config_str).expect("Failed to parse configuration file")
}
