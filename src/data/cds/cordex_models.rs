//! Available CORDEX GCM/RCM combinations per domain, resolution, and scenario.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPair {
    pub gcm: &'static str,
    pub rcm: &'static str,
}

const fn pair(gcm: &'static str, rcm: &'static str) -> ModelPair {
    ModelPair { gcm, rcm }
}

const AFRICA_022_RCP_2_6: &[ModelPair] = &[
    pair("MOHC-HadGEM2-ES", "CLMcom-KIT-CCLM5-0-15"),
    pair("MOHC-HadGEM2-ES", "GERICS-REMO2015"),
    pair("MOHC-HadGEM2-ES", "ICTP-RegCM4-7"),
    pair("MPI-M-MPI-ESM-MR", "ICTP-RegCM4-7"),
    pair("NCC-NorESM1-M", "CLMcom-KIT-CCLM5-0-15"),
    pair("NCC-NorESM1-M", "GERICS-REMO2015"),
    pair("NCC-NorESM1-M", "ICTP-RegCM4-7"),
    pair("MPI-M-MPI-ESM-LR", "CLMcom-KIT-CCLM5-0-15"),
    pair("MPI-M-MPI-ESM-LR", "GERICS-REMO2015"),
];

const AFRICA_022_RCP_4_5: &[ModelPair] = &[pair("CCCma-CanESM2", "CCCma-CanRCM4")];

const AFRICA_022_RCP_8_5: &[ModelPair] = &[
    pair("CCCma-CanESM2", "CCCma-CanRCM4"),
    pair("MOHC-HadGEM2-ES", "CLMcom-KIT-CCLM5-0-15"),
    pair("MOHC-HadGEM2-ES", "GERICS-REMO2015"),
    pair("MOHC-HadGEM2-ES", "ICTP-RegCM4-7"),
    pair("MPI-M-MPI-ESM-MR", "ICTP-RegCM4-7"),
    pair("NCC-NorESM1-M", "CLMcom-KIT-CCLM5-0-15"),
    pair("NCC-NorESM1-M", "GERICS-REMO2015"),
    pair("NCC-NorESM1-M", "ICTP-RegCM4-7"),
    pair("MPI-M-MPI-ESM-LR", "CLMcom-KIT-CCLM5-0-15"),
    pair("MPI-M-MPI-ESM-LR", "GERICS-REMO2015"),
];

/// Model pairs known to exist for a domain/resolution/scenario combination.
pub fn models_for(domain: &str, resolution: &str, scenario: &str) -> Option<&'static [ModelPair]> {
    match (domain, resolution, scenario) {
        ("africa", "0_22_degree_x_0_22_degree", "rcp_2_6") => Some(AFRICA_022_RCP_2_6),
        ("africa", "0_22_degree_x_0_22_degree", "rcp_4_5") => Some(AFRICA_022_RCP_4_5),
        ("africa", "0_22_degree_x_0_22_degree", "rcp_8_5") => Some(AFRICA_022_RCP_8_5),
        _ => None,
    }
}

/// CDS request form of a model name: lowercase with `_` separators.
pub fn model_stub(name: &str) -> String {
    name.replace('-', "_").to_lowercase()
}
