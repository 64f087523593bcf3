//! ABRASF `CompNfse` builder.
//!
//! Every function here is pure: a record goes in, a finished element tree
//! comes out. Child order follows the ABRASF schema and must not change.

use rust_decimal::Decimal;

use crate::invoice::rules::{format_amount, AmountField, TextField};
use crate::models::invoice::{InvoiceRecord, IssuerProfile};

use super::{XmlDocument, XmlElement, INVOICE_TAG};

/// Default namespace declared on the `ListaNfse` root.
pub const NFSE_NAMESPACE: &str = "http://www.abrasf.org.br/nfse.xsd";

/// Tax withheld at source: always "2" (not withheld).
const ISS_NOT_WITHHELD: &str = "2";

fn amount(field: AmountField, value: Decimal) -> XmlElement {
    XmlElement::text(field.element_name(), format_amount(value))
}

fn rps_identification(record: &InvoiceRecord) -> XmlElement {
    XmlElement::parent(
        "IdentificacaoRps",
        vec![
            XmlElement::text("Numero", &record.number),
            XmlElement::text("Serie", &record.service.rps_series),
            XmlElement::text("Tipo", &record.service.rps_type),
        ],
    )
}

fn service(record: &InvoiceRecord) -> XmlElement {
    let amounts = &record.amounts;
    let values = XmlElement::parent(
        "Valores",
        vec![
            amount(AmountField::ServiceValue, amounts.service_value),
            XmlElement::text("IssRetido", ISS_NOT_WITHHELD),
            amount(AmountField::Pis, amounts.pis),
            amount(AmountField::Cofins, amounts.cofins),
            amount(AmountField::Irrf, amounts.irrf),
            amount(AmountField::Inss, amounts.inss),
            amount(AmountField::Csll, amounts.csll),
        ],
    );

    XmlElement::parent(
        "Servico",
        vec![
            values,
            XmlElement::text("ItemListaServico", &record.issuer.service_item_code),
            XmlElement::text("CodigoMunicipio", &record.issuer.municipality_code),
            XmlElement::text("Discriminacao", &record.service.description),
        ],
    )
}

fn provider(issuer: &IssuerProfile) -> XmlElement {
    XmlElement::parent(
        "PrestadorServico",
        vec![
            XmlElement::parent(
                "IdentificacaoPrestador",
                vec![
                    XmlElement::text("Cnpj", &issuer.cnpj),
                    XmlElement::text("InscricaoMunicipal", &issuer.municipal_registration),
                ],
            ),
            XmlElement::text("RazaoSocial", &issuer.legal_name),
            XmlElement::parent(
                "Endereco",
                vec![
                    XmlElement::text("Endereco", &issuer.street),
                    XmlElement::text("Numero", &issuer.number),
                    XmlElement::text("Complemento", &issuer.complement),
                    XmlElement::text("Bairro", &issuer.district),
                    XmlElement::text("CodigoMunicipio", &issuer.municipality_code),
                    XmlElement::text("Uf", &issuer.state),
                    XmlElement::text("Cep", &issuer.postal_code),
                ],
            ),
        ],
    )
}

/// Build the `CompNfse` subtree for one record.
pub fn build_comp_nfse(record: &InvoiceRecord) -> XmlElement {
    let inf_nfse = XmlElement::parent(
        "InfNfse",
        vec![
            XmlElement::text(TextField::InvoiceNumber.element_name(), &record.number),
            XmlElement::text(
                TextField::VerificationCode.element_name(),
                &record.verification_code,
            ),
            XmlElement::text("DataEmissao", record.issued_at_iso()),
            rps_identification(record),
            XmlElement::text("NaturezaOperacao", &record.service.operation_nature),
            XmlElement::text("OptanteSimplesNacional", &record.service.simples_nacional),
            XmlElement::text("IncentivadorCultural", &record.service.cultural_incentive),
            XmlElement::text("Competencia", record.accounting_period()),
            service(record),
            provider(&record.issuer),
        ],
    )
    .with_attribute("Id", format!("NFS{}", record.number));

    XmlElement::parent(
        INVOICE_TAG,
        vec![XmlElement::parent("Nfse", vec![inf_nfse])],
    )
}

/// Serialize one record as a single-invoice `ListaNfse` document.
pub fn serialize(record: &InvoiceRecord) -> XmlDocument {
    XmlDocument::from_invoices(vec![build_comp_nfse(record)])
}

/// Serialize several records into one consolidated document, in order.
pub fn serialize_batch(records: &[InvoiceRecord]) -> XmlDocument {
    XmlDocument::from_invoices(records.iter().map(build_comp_nfse).collect())
}
