//! Static-configuration form validation.

use std::fmt;

use crate::network::{IpConfiguration, StaticIpConfiguration};

use super::{ValidationError, validate_dns_list, validate_gateway, validate_ip, validate_ip_with_mask};

/// Raw text of a static configuration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticForm {
    /// Address with prefix, `a.b.c.d/n`.
    pub address: String,
    /// Gateway address.
    pub gateway: String,
    /// Comma-separated DNS servers.
    pub dns: String,
}

impl StaticForm {
    /// Creates a form from its three fields.
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        gateway: impl Into<String>,
        dns: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            gateway: gateway.into(),
            dns: dns.into(),
        }
    }

    /// Pre-fills a form from an existing configuration's static parameters.
    #[must_use]
    pub fn from_configuration(config: &StaticIpConfiguration) -> Self {
        Self {
            address: config
                .ip_address
                .map(|address| address.to_string())
                .unwrap_or_default(),
            gateway: config.gateway.to_string(),
            dns: config.dns_list(),
        }
    }
}

/// Form field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The address/prefix field.
    Address,
    /// The gateway field.
    Gateway,
    /// The DNS list field.
    Dns,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => write!(f, "address"),
            Self::Gateway => write!(f, "gateway"),
            Self::Dns => write!(f, "dns"),
        }
    }
}

/// Per-field validation failures of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<(Field, ValidationError)>,
}

impl FormErrors {
    fn push(&mut self, field: Field, error: ValidationError) {
        self.errors.push((field, error));
    }

    /// The error for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, error)| error)
    }

    /// All failures in field order.
    pub fn iter(&self) -> impl Iterator<Item = &(Field, ValidationError)> {
        self.errors.iter()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

/// Validates a static form into a submittable configuration.
///
/// Every field is checked so all messages can be shown at once. The gateway
/// is checked against the address subnet only when both parse.
///
/// # Errors
///
/// Returns [`FormErrors`] listing each failed field.
pub fn validate_static_form(form: &StaticForm) -> Result<IpConfiguration, FormErrors> {
    let mut errors = FormErrors::default();

    let address = non_empty(&form.address)
        .and_then(validate_ip_with_mask)
        .map_err(|e| errors.push(Field::Address, e))
        .ok();

    let gateway = non_empty(&form.gateway)
        .and_then(|gateway| match address {
            Some(network) => validate_gateway(gateway, network),
            None => validate_ip(gateway),
        })
        .map_err(|e| errors.push(Field::Gateway, e))
        .ok();

    let dns_servers = non_empty(&form.dns)
        .and_then(validate_dns_list)
        .map_err(|e| errors.push(Field::Dns, e))
        .ok();

    match (address, gateway, dns_servers) {
        (Some(address), Some(gateway), Some(dns_servers)) if errors.is_empty() => Ok(
            IpConfiguration::static_ip(StaticIpConfiguration::new(Some(address), gateway, dns_servers)),
        ),
        _ => Err(errors),
    }
}

/// Trims surrounding whitespace, rejecting a field left empty.
fn non_empty(value: &str) -> Result<&str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::EmptyField)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn form(address: &str, gateway: &str, dns: &str) -> StaticForm {
        StaticForm::new(address, gateway, dns)
    }

    #[test]
    fn valid_form_builds_static_configuration() {
        let config = validate_static_form(&form("192.168.1.50/24", "192.168.1.1", "8.8.8.8, 1.1.1.1"))
            .unwrap();

        assert!(config.is_static());
        let static_config = config.static_config.unwrap();
        assert_eq!(static_config.ip_address.unwrap().to_string(), "192.168.1.50/24");
        assert_eq!(static_config.gateway, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(
            static_config.dns_servers,
            vec![Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(1, 1, 1, 1)]
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let config =
            validate_static_form(&form("192.168.1.50/24 ", " 192.168.1.1", " 8.8.8.8 ")).unwrap();

        let static_config = config.static_config.unwrap();
        assert_eq!(static_config.ip_address.unwrap().to_string(), "192.168.1.50/24");
        assert_eq!(static_config.gateway, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(static_config.dns_servers, vec![Ipv4Addr::new(8, 8, 8, 8)]);
    }

    #[test]
    fn empty_fields_are_all_reported() {
        let errors = validate_static_form(&form("", " ", "")).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Address), Some(&ValidationError::EmptyField));
        assert_eq!(errors.get(Field::Gateway), Some(&ValidationError::EmptyField));
        assert_eq!(errors.get(Field::Dns), Some(&ValidationError::EmptyField));
    }

    #[test]
    fn each_field_reports_its_own_failure() {
        let errors = validate_static_form(&form("192.168.1.50", "gw", "8.8.8.8,x")).unwrap_err();

        assert!(matches!(
            errors.get(Field::Address),
            Some(ValidationError::InvalidPrefixLength { .. })
        ));
        assert!(matches!(
            errors.get(Field::Gateway),
            Some(ValidationError::InvalidAddress { .. })
        ));
        assert!(matches!(
            errors.get(Field::Dns),
            Some(ValidationError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn gateway_outside_subnet_is_rejected() {
        let errors =
            validate_static_form(&form("192.168.1.50/24", "10.0.0.1", "8.8.8.8")).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.get(Field::Gateway),
            Some(ValidationError::GatewayOutsideSubnet { .. })
        ));
    }

    #[test]
    fn gateway_checked_alone_when_address_invalid() {
        let errors = validate_static_form(&form("bad/24", "10.0.0.1", "8.8.8.8")).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.get(Field::Gateway).is_none());
    }

    #[test]
    fn display_joins_field_messages() {
        let errors = validate_static_form(&form("", "192.168.1.1", "")).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "address: This field cannot be empty; dns: This field cannot be empty"
        );
    }

    #[test]
    fn from_configuration_round_trips_through_validation() {
        let original = StaticIpConfiguration::new(
            Some("10.0.0.5/8".parse().unwrap()),
            Ipv4Addr::new(10, 0, 0, 1),
            vec![Ipv4Addr::new(10, 0, 0, 53), Ipv4Addr::new(9, 9, 9, 9)],
        );

        let prefilled = StaticForm::from_configuration(&original);
        let config = validate_static_form(&prefilled).unwrap();

        assert_eq!(config.static_config, Some(original));
    }

    #[test]
    fn repeated_validation_is_identical() {
        let input = form("192.168.1.50/24", "192.168.1.1", "8.8.8.8,oops");
        assert_eq!(validate_static_form(&input), validate_static_form(&input));
    }
}
