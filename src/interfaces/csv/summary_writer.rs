use crate::domain::payroll::PayrollSummaryRow;
use crate::domain::records::PayPeriodId;
use crate::error::Result;
use std::io::Write;

/// File name used when a pay period's summary is exported as an attachment.
pub fn export_file_name(pay_period_id: PayPeriodId) -> String {
    format!("payroll_{pay_period_id}.csv")
}

/// Writes payroll summary rows as CSV.
///
/// The header row is always written, even for an empty summary, so consumers
/// can rely on the column layout.
pub struct SummaryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_rows(&mut self, rows: &[PayrollSummaryRow]) -> Result<()> {
        self.writer.write_record([
            "rep_id",
            "rep_name",
            "base_pay",
            "total_bonus",
            "total_compensation",
        ])?;
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(42), "payroll_42.csv");
    }

    #[test]
    fn test_writes_header_and_rows() {
        let rows = vec![PayrollSummaryRow {
            rep_id: 1,
            rep_name: "Ana, Jr.".to_string(),
            base_pay: Money::new(dec!(1000.00)),
            total_bonus: Money::new(dec!(150.25)),
            total_compensation: Money::new(dec!(1150.25)),
        }];

        let mut buffer = Vec::new();
        SummaryWriter::new(&mut buffer).write_rows(&rows).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("rep_id,rep_name,base_pay,total_bonus,total_compensation")
        );
        assert_eq!(lines.next(), Some("1,\"Ana, Jr.\",1000.00,150.25,1150.25"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_summary_still_has_header() {
        let mut buffer = Vec::new();
        SummaryWriter::new(&mut buffer).write_rows(&[]).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "rep_id,rep_name,base_pay,total_bonus,total_compensation\n"
        );
    }
}
