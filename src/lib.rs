#[allow(non_snake_case)]
pub mod Stoichiometry;
pub mod settings;
