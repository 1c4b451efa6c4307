//! Creature records and their tabular form.

use std::fmt;

use crate::table::{Column, Table};

/// The rarity tiers produced by the creature generator, rarest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers, most common first.
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Return the tier name as stored in the `Rarity` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Zero-based tier rank, 0 for Common.
    #[must_use]
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled creature document.
///
/// Field names serialize with the capitalized column names used in tables
/// and store files.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Level")]
    pub level: u32,
    #[serde(rename = "Rarity")]
    pub rarity: String,
    #[serde(rename = "Damage")]
    pub damage: String,
    #[serde(rename = "Health")]
    pub health: f64,
    #[serde(rename = "Energy")]
    pub energy: f64,
    #[serde(rename = "Sanity")]
    pub sanity: f64,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl Record {
    /// Column names of [`Table::from_records`], in order.
    pub const COLUMNS: [&'static str; 9] = [
        "Name", "Type", "Level", "Rarity", "Damage", "Health", "Energy", "Sanity", "Timestamp",
    ];
}

impl Table {
    /// Convert records into a table with the columns of [`Record::COLUMNS`].
    ///
    /// An empty slice yields a table with those columns and zero rows.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Table {
        let text = |f: fn(&Record) -> &String| records.iter().map(|r| f(r).clone()).collect();
        let num = |f: fn(&Record) -> f64| records.iter().map(f).collect();

        let columns = vec![
            Column::text("Name", text(|r| &r.name)),
            Column::text("Type", text(|r| &r.kind)),
            Column::numeric("Level", num(|r| f64::from(r.level))),
            Column::text("Rarity", text(|r| &r.rarity)),
            Column::text("Damage", text(|r| &r.damage)),
            Column::numeric("Health", num(|r| r.health)),
            Column::numeric("Energy", num(|r| r.energy)),
            Column::numeric("Sanity", num(|r| r.sanity)),
            Column::text("Timestamp", text(|r| &r.timestamp)),
        ];
        Table::new(columns).expect("record columns share one length and distinct names")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imp() -> Record {
        Record {
            name: "Ashen Imp".into(),
            kind: "Demonic".into(),
            level: 3,
            rarity: "Common".into(),
            damage: "1d6".into(),
            health: 21.5,
            energy: 18.0,
            sanity: 30.25,
            timestamp: "2026-01-01 09:00:00".into(),
        }
    }

    #[test]
    fn rarity_names_and_ranks() {
        assert_eq!(Rarity::Legendary.as_str(), "Legendary");
        assert_eq!(Rarity::Common.rank(), 0);
        assert_eq!(Rarity::Legendary.rank(), 4);
        assert_eq!(Rarity::Epic.to_string(), "Epic");
    }

    #[test]
    fn records_become_columns() {
        let table = Table::from_records(&[imp(), imp()]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column_names(), Record::COLUMNS.to_vec());
        assert_eq!(table.column("Level").unwrap().as_numeric(), Some(&[3.0, 3.0][..]));
        assert_eq!(
            table.column("Rarity").unwrap().as_text().unwrap()[0],
            "Common"
        );
    }

    #[test]
    fn empty_records_keep_schema() {
        let table = Table::from_records(&[]);
        assert!(table.is_empty());
        assert_eq!(table.n_columns(), 9);
    }
}
