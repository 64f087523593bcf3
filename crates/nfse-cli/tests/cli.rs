use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE_4521: &str = "\
PREFEITURA MUNICIPAL DE SANTOS
NOTA FISCAL DE SERVIÇOS ELETRÔNICA - NFSe 4521
Data e Hora de Emissão 12/03/2024 14:05:30
Código de Verificação AB12XZ
Valor dos Servicos R$: 1.234,56
PIS R$ 8,02
COFINS R$ 37,04
Valor ISS R$ 61,73
";

const INVOICE_4522: &str = "\
NFSe 4522
Data e Hora de Emissão 13/03/2024 09:00:00
Código de Verificação CD34YW
Valor dos Servicos R$: 500,00
";

const UNDATED: &str = "NFSe 77\nCódigo de Verificação ZZ99\nValor dos Servicos R$ 10,00\n";

/// Command isolated from any configuration in the real user directories.
fn nfse(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nfse").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn process_text_file_prints_xml() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "4521.txt", INVOICE_4521);

    nfse(tmp.path())
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        ))
        .stdout(predicate::str::contains(
            r#"<ListaNfse xmlns="http://www.abrasf.org.br/nfse.xsd">"#,
        ))
        .stdout(predicate::str::contains(r#"<InfNfse Id="NFS4521">"#))
        .stdout(predicate::str::contains("<CodigoVerificacao>AB12XZ</CodigoVerificacao>"))
        .stdout(predicate::str::contains("<DataEmissao>2024-03-12T14:05:30</DataEmissao>"))
        .stdout(predicate::str::contains("<ValorServicos>1234.56</ValorServicos>"))
        .stdout(predicate::str::contains("<ValorCsll>0.00</ValorCsll>"))
        .stdout(predicate::str::contains("<IssRetido>2</IssRetido>"));
}

#[test]
fn process_writes_json_to_file() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "4521.txt", INVOICE_4521);
    let output = tmp.path().join("4521.json");

    nfse(tmp.path())
        .args(["process", "--format", "json", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["number"], "4521");
    assert_eq!(json["verification_code"], "AB12XZ");
    assert_eq!(json["issued_at_source"], "document");
}

#[test]
fn process_compact_is_single_line() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "4521.txt", INVOICE_4521);

    let output = nfse(tmp.path())
        .args(["process", "--compact"])
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end().lines().count(), 1);
}

#[test]
fn process_missing_input_fails() {
    let tmp = TempDir::new().unwrap();

    nfse(tmp.path())
        .args(["process", "nao-existe.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_undated_invoice_warns() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "77.txt", UNDATED);

    nfse(tmp.path())
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<InfNfse Id="NFS77">"#))
        .stderr(predicate::str::contains("Issuance timestamp not found"));
}

#[test]
fn process_undated_invoice_fails_when_date_required() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "77.txt", UNDATED);
    let config = write(
        tmp.path(),
        "config.json",
        r#"{ "extraction": { "require_issue_date": true } }"#,
    );

    nfse(tmp.path())
        .arg("-c")
        .arg(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No issuance timestamp found"));
}

#[test]
fn batch_writes_one_file_per_input() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.txt", INVOICE_4521);
    write(tmp.path(), "b.txt", INVOICE_4522);
    write(tmp.path(), "notes.md", "ignored");

    nfse(tmp.path())
        .arg("batch")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    let converted = tmp.path().join("PDF_Convertido");
    let a = fs::read_to_string(converted.join("a.xml")).unwrap();
    let b = fs::read_to_string(converted.join("b.xml")).unwrap();
    assert!(a.contains(r#"Id="NFS4521""#));
    assert!(b.contains(r#"Id="NFS4522""#));
    assert!(!converted.join("notes.xml").exists());
}

#[test]
fn batch_consolidates_in_sorted_order() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "2.txt", INVOICE_4522);
    write(tmp.path(), "1.txt", INVOICE_4521);
    let out_dir = tmp.path().join("out");
    fs::create_dir(&out_dir).unwrap();

    nfse(tmp.path())
        .args(["batch", "--consolidate", "-o"])
        .arg(&out_dir)
        .arg(tmp.path())
        .assert()
        .success();

    let xml = fs::read_to_string(out_dir.join("nfse_comp_abrasf_CONSOLIDADO_vX.xml")).unwrap();
    assert_eq!(xml.matches("<ListaNfse").count(), 1);
    assert_eq!(xml.matches("<CompNfse>").count(), 2);
    let first = xml.find(r#"Id="NFS4521""#).unwrap();
    let second = xml.find(r#"Id="NFS4522""#).unwrap();
    assert!(first < second);
}

#[test]
fn batch_rejects_inputs_sharing_an_output_name() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("notas");
    fs::create_dir(&input).unwrap();
    write(&input, "a.TXT", INVOICE_4521);
    write(&input, "a.txt", INVOICE_4522);

    nfse(tmp.path())
        .arg("batch")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("share an output file name"));

    assert!(!input.join("PDF_Convertido").join("a.xml").exists());

    nfse(tmp.path())
        .args(["batch", "--consolidate"])
        .arg(&input)
        .assert()
        .success();

    let xml = fs::read_to_string(input.join("nfse_comp_abrasf_CONSOLIDADO_vX.xml")).unwrap();
    assert!(xml.contains(r#"Id="NFS4521""#));
    assert!(xml.contains(r#"Id="NFS4522""#));
}

#[test]
fn batch_without_inputs_fails() {
    let tmp = TempDir::new().unwrap();
    let empty = tmp.path().join("vazio");
    fs::create_dir(&empty).unwrap();

    nfse(tmp.path())
        .arg("batch")
        .arg(&empty)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF or text files found"));
}

#[test]
fn batch_continues_on_error_and_writes_summary() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.txt", INVOICE_4521);
    write(tmp.path(), "b.pdf", "this is not a pdf");

    nfse(tmp.path())
        .args(["batch", "--continue-on-error", "--summary"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed files:"));

    let summary = fs::read_to_string(tmp.path().join("PDF_Convertido").join("summary.csv")).unwrap();
    let mut lines = summary.lines();
    assert!(lines.next().unwrap().starts_with("filename,status,number"));
    assert!(lines.next().unwrap().starts_with("a.txt,success,4521,AB12XZ,2024-03-12T14:05:30,document,1234.56"));
    assert!(lines.next().unwrap().starts_with("b.pdf,error"));
}

#[test]
fn batch_stops_on_first_error_by_default() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.pdf", "this is not a pdf");
    write(tmp.path(), "b.txt", INVOICE_4521);

    nfse(tmp.path())
        .arg("batch")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));

    assert!(!tmp.path().join("PDF_Convertido").join("b.xml").exists());
}

#[test]
fn config_init_get_set() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("nfse").join("config.json");

    nfse(tmp.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    nfse(tmp.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "issuer.municipal_registration", "99887"])
        .assert()
        .success();

    nfse(tmp.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "issuer.municipal_registration"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""99887""#));

    nfse(tmp.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "output.indent", "0"])
        .assert()
        .success();

    nfse(tmp.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "output.indent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0"));
}

#[test]
fn config_set_rejects_empty_issuer_field() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.json");

    nfse(tmp.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "issuer.cnpj", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cnpj"));

    assert!(!config.exists());
}

#[test]
fn config_get_unknown_key_fails() {
    let tmp = TempDir::new().unwrap();

    nfse(tmp.path())
        .args(["config", "get", "ocr.threshold"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
