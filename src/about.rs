pub const SCAFFOLD_SERVICE_DISPLAY_VERSION: &str = env!("SCAFFOLD_SERVICE_DISPLAY_VERSION");
pub const SCAFFOLD_SERVICE_BUILD_N: &str = env!("SCAFFOLD_SERVICE_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "scaffold-service {}\nBuild {}\nIndexed FASTA scaffold fetcher",
        SCAFFOLD_SERVICE_DISPLAY_VERSION, SCAFFOLD_SERVICE_BUILD_N
    )
}
