use anyhow::{Result, anyhow, ensure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Teid = u32;
pub type Ebi = u8;

// TS24.007, 11.2.3.1.5: EPS bearer identity values 5-15 are usable.
pub const FIRST_EBI: Ebi = 5;
pub const LAST_EBI: Ebi = 15;
pub const BEARERS_PER_UE: usize = (LAST_EBI - FIRST_EBI + 1) as usize;

pub fn is_valid_ebi(ebi: Ebi) -> bool {
    (FIRST_EBI..=LAST_EBI).contains(&ebi)
}

const MAX_IMSI_DIGITS: usize = 15;

/// IMSI held as packed BCD, first digit in the low nibble, unused nibbles 0xf.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Imsi {
    bcd: [u8; 8],
    len: u8,
}

impl Imsi {
    pub fn digits(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len as usize).map(move |i| {
            let byte = self.bcd[i / 2];
            if i % 2 == 0 { byte & 0x0f } else { byte >> 4 }
        })
    }

    /// Numeric form, used as the index key and in logs.
    pub fn as_u64(&self) -> u64 {
        self.digits().fold(0, |acc, d| acc * 10 + d as u64)
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromStr for Imsi {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ensure!(
            !s.is_empty() && s.len() <= MAX_IMSI_DIGITS,
            "IMSI must be 1 to {MAX_IMSI_DIGITS} digits, got {}",
            s.len()
        );
        let mut bcd = [0xff; 8];
        for (i, c) in s.chars().enumerate() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| anyhow!("IMSI {s} contained a non digit"))? as u8;
            let byte = &mut bcd[i / 2];
            *byte = if i % 2 == 0 {
                (*byte & 0xf0) | digit
            } else {
                (*byte & 0x0f) | (digit << 4)
            };
        }
        Ok(Imsi {
            bcd,
            len: s.len() as u8,
        })
    }
}

impl TryFrom<String> for Imsi {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Imsi> for String {
    fn from(imsi: Imsi) -> Self {
        imsi.to_string()
    }
}

impl fmt::Display for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in self.digits() {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imsi({self})")
    }
}
