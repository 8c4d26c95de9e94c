use super::{MethodSpec, PhaseSpec, ServiceType};
use crate::device::Platform;

const ANDROID: &[Platform] = &[Platform::Android];
const IOS: &[Platform] = &[Platform::Ios];
const ANY: &[Platform] = &[Platform::Android, Platform::Ios];

const fn phase(name: &'static str, delay_ms: u64) -> PhaseSpec {
    PhaseSpec { name, delay_ms }
}

// screen_unlock

const PIN_REMOVAL: &[PhaseSpec] = &[
    phase("detecting_lock_type", 800),
    phase("preparing_device", 1_200),
    phase("removing_lock", 3_000),
    phase("verifying", 1_000),
    phase("finalizing", 500),
];

const PATTERN_REMOVAL: &[PhaseSpec] = &[
    phase("detecting_lock_type", 800),
    phase("entering_recovery", 2_000),
    phase("removing_lock", 2_500),
    phase("finalizing", 500),
];

const PASSCODE_REMOVAL: &[PhaseSpec] = &[
    phase("detecting_device", 1_000),
    phase("entering_dfu_mode", 2_000),
    phase("downloading_firmware", 6_000),
    phase("verifying_firmware", 1_500),
    phase("removing_passcode", 3_000),
    phase("finalizing", 500),
];

// system_repair

const STANDARD_REPAIR: &[PhaseSpec] = &[
    phase("analyzing_system", 1_500),
    phase("downloading_firmware", 6_000),
    phase("verifying_firmware", 1_500),
    phase("repairing_system", 3_000),
    phase("restarting_device", 2_000),
    phase("finalizing", 500),
];

const DEEP_REPAIR: &[PhaseSpec] = &[
    phase("analyzing_system", 1_500),
    phase("backing_up_partitions", 2_500),
    phase("downloading_firmware", 6_000),
    phase("verifying_firmware", 1_500),
    phase("flashing_firmware", 4_000),
    phase("restoring_partitions", 2_500),
    phase("restarting_device", 2_000),
    phase("finalizing", 500),
];

const RECOVERY_MODE_EXIT: &[PhaseSpec] = &[
    phase("detecting_recovery_mode", 800),
    phase("sending_exit_command", 1_200),
    phase("finalizing", 500),
];

// data_eraser

const QUICK_ERASE: &[PhaseSpec] = &[
    phase("scanning_storage", 1_000),
    phase("erasing_data", 2_000),
    phase("verifying_erasure", 1_000),
    phase("finalizing", 500),
];

const DOD_SECURE_ERASE: &[PhaseSpec] = &[
    phase("scanning_storage", 1_000),
    phase("overwrite_pass_zeros", 3_000),
    phase("overwrite_pass_ones", 3_000),
    phase("overwrite_pass_random", 3_000),
    phase("verifying_erasure", 1_500),
    phase("finalizing", 500),
];

const GUTMANN_ERASE: &[PhaseSpec] = &[
    phase("scanning_storage", 1_000),
    phase("overwrite_patterned_passes", 4_000),
    phase("overwrite_random_passes", 4_000),
    phase("verifying_erasure", 2_000),
    phase("finalizing", 500),
];

// frp_bypass

const ADB_FRP_BYPASS: &[PhaseSpec] = &[
    phase("connecting_device", 1_000),
    phase("enabling_adb", 1_500),
    phase("removing_frp_lock", 2_500),
    phase("finalizing", 500),
];

const SAMSUNG_FRP_BYPASS: &[PhaseSpec] = &[
    phase("connecting_device", 1_000),
    phase("detecting_model", 800),
    phase("opening_test_mode", 2_000),
    phase("enabling_adb", 1_500),
    phase("removing_frp_lock", 2_500),
    phase("finalizing", 500),
];

const TALKBACK_FRP_BYPASS: &[PhaseSpec] = &[
    phase("connecting_device", 1_000),
    phase("launching_accessibility", 1_500),
    phase("opening_browser", 1_500),
    phase("removing_frp_lock", 2_500),
    phase("finalizing", 500),
];

const UNIVERSAL_FRP_BYPASS: &[PhaseSpec] = &[
    phase("connecting_device", 1_000),
    phase("detecting_security_patch", 1_000),
    phase("downloading_exploit_profile", 4_000),
    phase("removing_frp_lock", 3_000),
    phase("finalizing", 500),
];

// icloud_bypass

const CHECKM8_BYPASS: &[PhaseSpec] = &[
    phase("detecting_device", 1_000),
    phase("entering_dfu_mode", 2_000),
    phase("running_checkm8", 3_000),
    phase("booting_ramdisk", 3_000),
    phase("patching_activation", 2_500),
    phase("finalizing", 500),
];

const ACTIVATION_LOCK_BYPASS: &[PhaseSpec] = &[
    phase("detecting_device", 1_000),
    phase("jailbreaking_device", 4_000),
    phase("patching_activation", 2_500),
    phase("restarting_device", 2_000),
    phase("finalizing", 500),
];

const MDM_BYPASS: &[PhaseSpec] = &[
    phase("detecting_device", 1_000),
    phase("removing_mdm_profile", 2_000),
    phase("verifying", 1_000),
    phase("finalizing", 500),
];

pub(super) static METHODS: &[MethodSpec] = &[
    MethodSpec {
        service: ServiceType::ScreenUnlock,
        name: "pin_removal",
        total_steps: 5,
        phases: PIN_REMOVAL,
        failure_probability: 0.01,
        platforms: ANY,
        outcome: "screen_lock_removed",
    },
    MethodSpec {
        service: ServiceType::ScreenUnlock,
        name: "pattern_removal",
        total_steps: 4,
        phases: PATTERN_REMOVAL,
        failure_probability: 0.01,
        platforms: ANDROID,
        outcome: "screen_lock_removed",
    },
    MethodSpec {
        service: ServiceType::ScreenUnlock,
        name: "passcode_removal",
        total_steps: 8,
        phases: PASSCODE_REMOVAL,
        failure_probability: 0.02,
        platforms: IOS,
        outcome: "passcode_removed",
    },
    MethodSpec {
        service: ServiceType::SystemRepair,
        name: "standard_repair",
        total_steps: 10,
        phases: STANDARD_REPAIR,
        failure_probability: 0.01,
        platforms: ANY,
        outcome: "system_repaired",
    },
    MethodSpec {
        service: ServiceType::SystemRepair,
        name: "deep_repair",
        total_steps: 16,
        phases: DEEP_REPAIR,
        failure_probability: 0.03,
        platforms: ANY,
        outcome: "system_repaired",
    },
    MethodSpec {
        service: ServiceType::SystemRepair,
        name: "recovery_mode_exit",
        total_steps: 3,
        phases: RECOVERY_MODE_EXIT,
        failure_probability: 0.001,
        platforms: ANY,
        outcome: "recovery_mode_exited",
    },
    MethodSpec {
        service: ServiceType::DataEraser,
        name: "quick_erase",
        total_steps: 4,
        phases: QUICK_ERASE,
        failure_probability: 0.005,
        platforms: ANY,
        outcome: "data_erased",
    },
    MethodSpec {
        service: ServiceType::DataEraser,
        name: "dod_secure_erase",
        total_steps: 12,
        phases: DOD_SECURE_ERASE,
        failure_probability: 0.005,
        platforms: ANY,
        outcome: "data_erased",
    },
    MethodSpec {
        service: ServiceType::DataEraser,
        name: "gutmann_erase",
        total_steps: 20,
        phases: GUTMANN_ERASE,
        failure_probability: 0.01,
        platforms: ANY,
        outcome: "data_erased",
    },
    MethodSpec {
        service: ServiceType::FrpBypass,
        name: "adb_frp_bypass",
        total_steps: 4,
        phases: ADB_FRP_BYPASS,
        failure_probability: 0.02,
        platforms: ANDROID,
        outcome: "frp_lock_removed",
    },
    MethodSpec {
        service: ServiceType::FrpBypass,
        name: "samsung_frp_bypass",
        total_steps: 6,
        phases: SAMSUNG_FRP_BYPASS,
        failure_probability: 0.03,
        platforms: ANDROID,
        outcome: "frp_lock_removed",
    },
    MethodSpec {
        service: ServiceType::FrpBypass,
        name: "talkback_frp_bypass",
        total_steps: 5,
        phases: TALKBACK_FRP_BYPASS,
        failure_probability: 0.04,
        platforms: ANDROID,
        outcome: "frp_lock_removed",
    },
    MethodSpec {
        service: ServiceType::FrpBypass,
        name: "universal_frp_bypass",
        total_steps: 7,
        phases: UNIVERSAL_FRP_BYPASS,
        failure_probability: 0.05,
        platforms: ANDROID,
        outcome: "frp_lock_removed",
    },
    MethodSpec {
        service: ServiceType::IcloudBypass,
        name: "checkm8_bypass",
        total_steps: 8,
        phases: CHECKM8_BYPASS,
        failure_probability: 0.02,
        platforms: IOS,
        outcome: "activation_lock_bypassed",
    },
    MethodSpec {
        service: ServiceType::IcloudBypass,
        name: "activation_lock_bypass",
        total_steps: 6,
        phases: ACTIVATION_LOCK_BYPASS,
        failure_probability: 0.03,
        platforms: IOS,
        outcome: "activation_lock_bypassed",
    },
    MethodSpec {
        service: ServiceType::IcloudBypass,
        name: "mdm_bypass",
        total_steps: 4,
        phases: MDM_BYPASS,
        failure_probability: 0.01,
        platforms: IOS,
        outcome: "mdm_profile_removed",
    },
];
