use serde::{Deserialize, Serialize};

use crate::error::{Result, SolarError};

/// A single invoice line. `amount` always equals `quantity * rate`; it is
/// recomputed whenever either changes and when a line is read back from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord")]
pub struct InvoiceItem {
    name: String,
    hsn: String,
    quantity: f64,
    rate: f64,
    amount: f64,
}

/// Stored shape of a line; any persisted `amount` is ignored.
#[derive(Deserialize)]
struct ItemRecord {
    name: String,
    #[serde(default)]
    hsn: String,
    quantity: f64,
    rate: f64,
}

impl TryFrom<ItemRecord> for InvoiceItem {
    type Error = SolarError;

    fn try_from(record: ItemRecord) -> Result<Self> {
        InvoiceItem::new(record.name, record.hsn, record.quantity, record.rate)
    }
}

impl InvoiceItem {
    pub fn new(
        name: impl Into<String>,
        hsn: impl Into<String>,
        quantity: f64,
        rate: f64,
    ) -> Result<Self> {
        validate_quantity(quantity)?;
        validate_rate(rate)?;
        let amount = line_amount(quantity, rate)?;
        Ok(Self {
            name: name.into(),
            hsn: hsn.into(),
            quantity,
            rate,
            amount,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hsn(&self) -> &str {
        &self.hsn
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn set_quantity(&mut self, quantity: f64) -> Result<()> {
        validate_quantity(quantity)?;
        self.amount = line_amount(quantity, self.rate)?;
        self.quantity = quantity;
        Ok(())
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        validate_rate(rate)?;
        self.amount = line_amount(self.quantity, rate)?;
        self.rate = rate;
        Ok(())
    }
}

fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(SolarError::invalid(
            "quantity",
            format!("{quantity} must be greater than 0"),
        ));
    }
    Ok(())
}

fn validate_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(SolarError::invalid("rate", format!("{rate} must not be negative")));
    }
    Ok(())
}

fn line_amount(quantity: f64, rate: f64) -> Result<f64> {
    let amount = quantity * rate;
    if !amount.is_finite() {
        return Err(SolarError::invalid(
            "amount",
            format!("{quantity} x {rate} is too large"),
        ));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_follows_quantity_and_rate() {
        let mut item = InvoiceItem::new("Loom Solar 440W Mono PERC Panel", "85414011", 2.0, 18_500.0)
            .unwrap();
        assert_eq!(item.amount(), 37_000.0);

        item.set_quantity(6.0).unwrap();
        assert_eq!(item.amount(), 111_000.0);

        item.set_rate(18_000.0).unwrap();
        assert_eq!(item.amount(), 108_000.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(InvoiceItem::new("x", "", 0.0, 10.0).is_err());
        assert!(InvoiceItem::new("x", "", 1.0, -1.0).is_err());

        let mut item = InvoiceItem::new("x", "", 1.0, 0.0).unwrap();
        assert!(item.set_quantity(-2.0).is_err());
        assert_eq!(item.quantity(), 1.0);
    }

    #[test]
    fn stored_amount_is_recomputed() {
        let item: InvoiceItem = toml::from_str(
            r#"
name = "Installation & Wiring Charges"
hsn = "998314"
quantity = 1.0
rate = 15000.0
amount = 99.0
"#,
        )
        .unwrap();
        assert_eq!(item.amount(), 15_000.0);
    }

    #[test]
    fn stored_negative_quantity_is_rejected() {
        let parsed: std::result::Result<InvoiceItem, _> =
            toml::from_str("name = \"x\"\nquantity = -1.0\nrate = 5.0\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn overflowing_amount_is_rejected() {
        assert!(InvoiceItem::new("x", "", 1e200, 1e200).is_err());

        let mut item = InvoiceItem::new("x", "", 1e200, 1.0).unwrap();
        assert!(item.set_rate(1e200).is_err());
        assert_eq!(item.rate(), 1.0);
        assert_eq!(item.amount(), 1e200);

        let mut item = InvoiceItem::new("x", "", 1.0, 1e200).unwrap();
        assert!(item.set_quantity(1e200).is_err());
        assert_eq!(item.quantity(), 1.0);
    }
}
