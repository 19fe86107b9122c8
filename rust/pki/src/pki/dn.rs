//! Renders certificate subjects as canonical distinguished names, most specific attribute first.
use snafu::{ResultExt, Snafu};
use x509_parser::{
    certificate::X509Certificate, error::PEMError, error::X509Error, nom, parse_x509_certificate,
    pem::parse_x509_pem, x509::AttributeTypeAndValue,
};

/// Universal tag number of an ASN.1 BMPString.
const BMP_STRING_TAG: u32 = 30;

/// Attribute kinds in the order they appear in a rendered DN.
const RENDER_ORDER: [SubjectAttributeKind; 9] = [
    SubjectAttributeKind::SerialNumber,
    SubjectAttributeKind::CommonName,
    SubjectAttributeKind::OrganizationalUnit,
    SubjectAttributeKind::Organization,
    SubjectAttributeKind::PostalCode,
    SubjectAttributeKind::StreetAddress,
    SubjectAttributeKind::Locality,
    SubjectAttributeKind::Province,
    SubjectAttributeKind::Country,
];

#[derive(Snafu, Debug)]
pub enum SubjectError {
    #[snafu(display("failed to decode PEM certificate"))]
    DecodePem { source: nom::Err<PEMError> },

    #[snafu(display("failed to parse DER certificate"))]
    ParseCertificate { source: nom::Err<X509Error> },
}

#[derive(strum::Display, Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SubjectAttributeKind {
    #[strum(serialize = "C")]
    Country,
    #[strum(serialize = "O")]
    Organization,
    #[strum(serialize = "OU")]
    OrganizationalUnit,
    #[strum(serialize = "L")]
    Locality,
    #[strum(serialize = "ST")]
    Province,
    #[strum(serialize = "STREET")]
    StreetAddress,
    #[strum(serialize = "POSTALCODE")]
    PostalCode,
    #[strum(serialize = "SERIALNUMBER")]
    SerialNumber,
    #[strum(serialize = "CN")]
    CommonName,
}

impl SubjectAttributeKind {
    /// Maps a dotted attribute type OID, `None` for attributes that are not part of a DN.
    pub fn from_oid(oid: &str) -> Option<Self> {
        match oid {
            "2.5.4.6" => Some(Self::Country),
            "2.5.4.10" => Some(Self::Organization),
            "2.5.4.11" => Some(Self::OrganizationalUnit),
            "2.5.4.7" => Some(Self::Locality),
            "2.5.4.8" => Some(Self::Province),
            "2.5.4.9" => Some(Self::StreetAddress),
            "2.5.4.17" => Some(Self::PostalCode),
            "2.5.4.5" => Some(Self::SerialNumber),
            "2.5.4.3" => Some(Self::CommonName),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubjectAttribute {
    pub kind: SubjectAttributeKind,
    pub value: String,
}

impl SubjectAttribute {
    pub fn new(kind: SubjectAttributeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Something that carries a certificate subject.
pub trait CertificateSubject {
    /// Subject attributes in the order they were encoded.
    fn subject_attributes(&self) -> Result<Vec<SubjectAttribute>, SubjectError>;
}

impl CertificateSubject for [SubjectAttribute] {
    fn subject_attributes(&self) -> Result<Vec<SubjectAttribute>, SubjectError> {
        Ok(self.to_vec())
    }
}

impl CertificateSubject for Vec<SubjectAttribute> {
    fn subject_attributes(&self) -> Result<Vec<SubjectAttribute>, SubjectError> {
        Ok(self.clone())
    }
}

/// The material of a signed user certificate.
///
/// `ca` and `key` are kept PEM encoded, `certificate` is DER.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserCertificate {
    pub ca: Vec<u8>,
    pub certificate: Vec<u8>,
    pub key: Vec<u8>,
}

impl UserCertificate {
    pub fn from_pem(certificate: &[u8]) -> Result<Self, SubjectError> {
        let (_, pem) = parse_x509_pem(certificate).context(DecodePemSnafu)?;
        Ok(Self {
            certificate: pem.contents,
            ..Self::default()
        })
    }

    pub fn dn(&self) -> Result<String, SubjectError> {
        distinguished_name(self)
    }
}

impl CertificateSubject for UserCertificate {
    fn subject_attributes(&self) -> Result<Vec<SubjectAttribute>, SubjectError> {
        let (_, certificate) =
            parse_x509_certificate(&self.certificate).context(ParseCertificateSnafu)?;
        Ok(x509_subject_attributes(&certificate))
    }
}

/// Attributes of a DN kind whose value decodes to text. Everything else is skipped.
fn x509_subject_attributes(certificate: &X509Certificate<'_>) -> Vec<SubjectAttribute> {
    certificate
        .subject()
        .iter_attributes()
        .filter_map(|attribute| {
            let kind = SubjectAttributeKind::from_oid(&attribute.attr_type().to_id_string())?;
            Some(SubjectAttribute::new(kind, attribute_value(attribute)?))
        })
        .collect()
}

fn attribute_value(attribute: &AttributeTypeAndValue<'_>) -> Option<String> {
    if let Ok(value) = attribute.as_str() {
        return Some(value.to_string());
    }

    // BMPString is UCS-2 (big endian), which x509-parser does not expose as str
    let value = attribute.attr_value();
    if value.header.tag().0 != BMP_STRING_TAG || value.data.len() % 2 != 0 {
        return None;
    }
    let code_units = value
        .data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(code_units)
        .collect::<Result<String, _>>()
        .ok()
}

/// Renders the subject as a single DN string such as `CN=admin,OU=Data,O=Example,C=DE`.
///
/// Attributes are ordered by kind, repeated kinds in reverse encoding order.
/// Empty values are left out.
pub fn distinguished_name(
    subject: &(impl CertificateSubject + ?Sized),
) -> Result<String, SubjectError> {
    let attributes = subject.subject_attributes()?;

    Ok(RENDER_ORDER
        .iter()
        .flat_map(|kind| {
            attributes
                .iter()
                .rev()
                .filter(move |attribute| attribute.kind == *kind)
        })
        .filter(|attribute| !attribute.value.is_empty())
        .map(|attribute| format!("{}={}", attribute.kind, escape_value(&attribute.value)))
        .collect::<Vec<_>>()
        .join(","))
}

fn escape_value(value: &str) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut escaped = String::with_capacity(value.len());
    for (index, c) in value.chars().enumerate() {
        let special = matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=')
            || (index == 0 && matches!(c, ' ' | '#'))
            || (index == last && c == ' ');
        if special {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
