use std::path::PathBuf;

pub struct ConfigArgs {
    pub config: PathBuf,
}

pub struct DumpArgs {
    pub config: PathBuf,
    pub file: PathBuf,
}

pub struct RunArgs {
    pub config: PathBuf,
    pub once: bool,
}
