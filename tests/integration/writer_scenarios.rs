//! Rendering scenarios through whole documents

use nix_scribe::document::{NixFile, OptionBlock};
use nix_scribe::nix::{quote_key, with_pkgs, NixWriter, Value, WriterOptions};

fn described_node() -> NixFile {
    let mut block = OptionBlock::new("firewall", "sets up firewall options");
    block.set(
        "networking",
        Value::attrs_from([("firewall.enable", true)]),
    );
    let mut file = NixFile::new("configuration", "Generated");
    file.add_block(block);
    file
}

#[test]
fn test_described_node() {
    assert_eq!(
        described_node().text(),
        "\
# Generated
{

  # sets up firewall options
  networking = {
    firewall.enable = true;
  };

}"
    );
}

#[test]
fn test_described_node_without_comments() {
    assert_eq!(
        described_node().text_with(WriterOptions::without_comments()),
        "{\n\n  networking = {\n    firewall.enable = true;\n  };\n\n}"
    );
}

#[test]
fn test_arguments_header() {
    let mut block = OptionBlock::new("packages", "");
    block
        .add_argument("pkgs")
        .set("environment.systemPackages", with_pkgs(["vim"]));
    let mut other = OptionBlock::new("lib", "");
    other
        .add_argument("lib")
        .add_argument("pkgs")
        .set("boot.loader.timeout", Value::literal("lib.mkDefault 3"));

    let mut file = NixFile::new("configuration", "");
    file.add_block(block);
    file.add_block(other);

    assert_eq!(
        file.text(),
        "\
{lib, pkgs, ...}:
{

  environment.systemPackages = with pkgs; [
    vim
  ];

  boot.loader.timeout = lib.mkDefault 3;

}"
    );
}

#[test]
fn test_interpolation_is_escaped() {
    let mut block = OptionBlock::new("bash", "");
    block.set("programs.bash.promptInit", "PS1='${debian_chroot}'");
    block.set(
        "programs.bash.interactiveShellInit",
        "PS1='${debian_chroot}'\nexport EDITOR=nano",
    );
    let mut file = NixFile::new("configuration", "");
    file.add_block(block);
    let text = file.text();

    assert!(text.contains("  programs.bash.promptInit = \"PS1='\\${debian_chroot}'\";\n"));
    assert!(text.contains(
        "  programs.bash.interactiveShellInit = ''\n    PS1='${\"$\"}{debian_chroot}'\n    export EDITOR=nano\n  '';\n"
    ));
    assert!(!text.contains("'''${"));
}

#[test]
fn test_key_quoting_in_output() {
    let mut writer = NixWriter::new();
    writer.write_value(&Value::attrs_from([
        ("a.12.c", Value::Bool(true)),
        ("127.0.0.1", Value::from("localhost")),
        (".hello", Value::Null),
        ("services.\"display-manager\".enable", Value::Bool(false)),
    ]));
    assert_eq!(
        writer.text(),
        "\
{
  a.\"12\".c = true;
  \"127.0.0.1\" = \"localhost\";
  \".hello\" = null;
  services.\"display-manager\".enable = false;
}"
    );
}

#[test]
fn test_quoted_dotted_settings() {
    let settings = Value::attrs_from([(
        "connection",
        Value::attrs_from([("wifi.powersave", Value::Int(2))]),
    )])
    .quote_dotted_keys();

    let mut writer = NixWriter::new();
    writer.write_attr("networking.networkmanager.settings", &settings);
    assert_eq!(
        writer.text(),
        "networking.networkmanager.settings = {\n  connection = {\n    \"wifi.powersave\" = 2;\n  };\n};\n"
    );
    assert_eq!(quote_key("\"wifi.powersave\""), "\"wifi.powersave\"");
}

#[test]
fn test_lists_of_sets() {
    let mut writer = NixWriter::new();
    writer.write_attr(
        "networking.hosts",
        &Value::List(vec![
            Value::attrs_from([("name", "nas")]),
            Value::from("plain"),
        ]),
    );
    assert_eq!(
        writer.text(),
        "networking.hosts = [\n  {\n    name = \"nas\";\n  }\n  \"plain\"\n];\n"
    );
}
