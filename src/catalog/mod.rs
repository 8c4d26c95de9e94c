//! Method and phase tables for every advanced service
//!
//! Each service owns a fixed set of methods. A method fixes the step count,
//! the ordered phases those steps pass through, how long each phase takes,
//! and the chance that any single step fails. The engine reads these tables
//! and never branches on a method name.

mod tables;

use crate::device::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Advanced operation families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    ScreenUnlock,
    SystemRepair,
    DataEraser,
    FrpBypass,
    IcloudBypass,
}

impl ServiceType {
    pub const ALL: [ServiceType; 5] = [
        ServiceType::ScreenUnlock,
        ServiceType::SystemRepair,
        ServiceType::DataEraser,
        ServiceType::FrpBypass,
        ServiceType::IcloudBypass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ScreenUnlock => "screen_unlock",
            ServiceType::SystemRepair => "system_repair",
            ServiceType::DataEraser => "data_eraser",
            ServiceType::FrpBypass => "frp_bypass",
            ServiceType::IcloudBypass => "icloud_bypass",
        }
    }

    /// Methods available for this service, in table order
    pub fn methods(&self) -> impl Iterator<Item = &'static MethodSpec> + '_ {
        tables::METHODS.iter().filter(move |m| m.service == *self)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceType::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| format!("unknown service type '{s}'"))
    }
}

/// A named stretch of steps sharing one per-step delay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSpec {
    pub name: &'static str,
    pub delay_ms: u64,
}

/// Static description of one method
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSpec {
    pub service: ServiceType,
    pub name: &'static str,
    pub total_steps: u32,
    pub phases: &'static [PhaseSpec],
    pub failure_probability: f64,
    pub platforms: &'static [Platform],
    /// Label recorded in the result details on success
    pub outcome: &'static str,
}

impl MethodSpec {
    /// Index into `phases` for a 1-based step
    fn phase_index(&self, step: u32) -> usize {
        if self.phases.is_empty() || self.total_steps == 0 {
            return 0;
        }
        let step = step.clamp(1, self.total_steps) - 1;
        let idx = (step as usize * self.phases.len()) / self.total_steps as usize;
        idx.min(self.phases.len() - 1)
    }

    /// Phase label for a 1-based step (step 0 maps to the first phase)
    pub fn phase_for_step(&self, step: u32) -> &'static str {
        self.phases
            .get(self.phase_index(step))
            .map(|p| p.name)
            .unwrap_or("processing")
    }

    /// Unscaled delay spent on a 1-based step
    pub fn delay_for_step(&self, step: u32) -> Duration {
        let ms = self
            .phases
            .get(self.phase_index(step))
            .map(|p| p.delay_ms)
            .unwrap_or(0);
        Duration::from_millis(ms)
    }

    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    /// Sum of all step delays, the nominal run time of the method
    pub fn nominal_duration(&self) -> Duration {
        (1..=self.total_steps).map(|s| self.delay_for_step(s)).sum()
    }
}

/// Look up a method within a service's allow-list
pub fn lookup(service: ServiceType, method: &str) -> Option<&'static MethodSpec> {
    service.methods().find(|m| m.name == method)
}

/// Every method of every service
pub fn all_methods() -> &'static [MethodSpec] {
    tables::METHODS
}
