use serde::{Deserialize, Serialize};

use crate::utils::error::{EoError, Result};
use crate::utils::validation::{validate_range, Validate};

/// Geographic bounding box in EPSG:4326 lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        let bbox = Self {
            xmin,
            ymin,
            xmax,
            ymax,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// CDS `area` ordering: [north, west, south, east].
    pub fn area_nwse(&self) -> [f64; 4] {
        [self.ymax, self.xmin, self.ymin, self.xmax]
    }

    /// MARS `area` string: `N/W/S/E`.
    pub fn mars_area(&self) -> String {
        format!("{}/{}/{}/{}", self.ymax, self.xmin, self.ymin, self.xmax)
    }

    /// Parse `xmin,ymin,xmax,ymax`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(EoError::InvalidValueError {
                field: "bbox".to_string(),
                value: s.to_string(),
                reason: "Expected xmin,ymin,xmax,ymax".to_string(),
            });
        }
        let mut coords = [0.0f64; 4];
        for (i, part) in parts.iter().enumerate() {
            coords[i] = part.parse().map_err(|_| EoError::InvalidValueError {
                field: "bbox".to_string(),
                value: s.to_string(),
                reason: format!("'{}' is not a number", part),
            })?;
        }
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }
}

impl Validate for BBox {
    fn validate(&self) -> Result<()> {
        validate_range("bbox.xmin", self.xmin, -180.0, 180.0)?;
        validate_range("bbox.xmax", self.xmax, -180.0, 180.0)?;
        validate_range("bbox.ymin", self.ymin, -90.0, 90.0)?;
        validate_range("bbox.ymax", self.ymax, -90.0, 90.0)?;
        if self.xmin >= self.xmax || self.ymin >= self.ymax {
            return Err(EoError::InvalidValueError {
                field: "bbox".to_string(),
                value: format!(
                    "{},{},{},{}",
                    self.xmin, self.ymin, self.xmax, self.ymax
                ),
                reason: "min coordinates must be less than max coordinates".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorders_coordinates_for_cds_area() {
        let bbox = BBox::new(-13.3, 6.9, -10.2, 10.0).unwrap();
        assert_eq!(bbox.area_nwse(), [10.0, -13.3, 6.9, -10.2]);
        assert_eq!(bbox.mars_area(), "10/-13.3/6.9/-10.2");
    }

    #[test]
    fn parses_comma_separated_form() {
        let bbox = BBox::parse("-13.3, 6.9, -10.2, 10.0").unwrap();
        assert_eq!(bbox.xmin, -13.3);
        assert_eq!(bbox.ymax, 10.0);
        assert!(BBox::parse("1,2,3").is_err());
        assert!(BBox::parse("a,b,c,d").is_err());
    }

    #[test]
    fn rejects_inverted_and_out_of_range_boxes() {
        assert!(BBox::new(10.0, 0.0, -10.0, 5.0).is_err());
        assert!(BBox::new(-200.0, 0.0, 10.0, 5.0).is_err());
        assert!(BBox::new(0.0, 80.0, 10.0, 95.0).is_err());
    }
}
