#[test]
fn add_property() {
    trycmd::TestCases::new()
        .case("tests/add-property/*.toml")
        .env("HALODB_ALLOW_STDIN", "true")
        .default_bin_name("halodb");
}

#[test]
fn add_simulation() {
    trycmd::TestCases::new()
        .case("tests/add-simulation/*.toml")
        .env("HALODB_ALLOW_STDIN", "true")
        .default_bin_name("halodb");
}

#[test]
fn delete_property() {
    trycmd::TestCases::new()
        .case("tests/delete-property/*.toml")
        .env("HALODB_ALLOW_STDIN", "true")
        .default_bin_name("halodb");
}

#[test]
fn show() {
    trycmd::TestCases::new()
        .case("tests/show/*.toml")
        .env("HALODB_ALLOW_STDIN", "true")
        .default_bin_name("halodb");
}
