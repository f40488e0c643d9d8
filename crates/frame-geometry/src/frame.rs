//! Frame placement (cover-fit)

use crate::{check_dimension, GeometryError};
use serde::{Deserialize, Serialize};

/// Placement of one decoded image on a surface.
///
/// The source rectangle always spans the whole image. The destination rectangle is
/// the image scaled by `ratio` and centered on the surface, so `dx`/`dy` go negative
/// when the scaled image overflows and gets cropped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FramePlacement {
    pub sx: f64,
    pub sy: f64,
    pub s_width: f64,
    pub s_height: f64,
    pub dx: f64,
    pub dy: f64,
    pub d_width: f64,
    pub d_height: f64,
    /// Uniform scale factor applied to the source
    pub ratio: f64,
}

impl FramePlacement {
    /// Compute a cover-fit placement of a `source_width`x`source_height` image onto a
    /// `dest_width`x`dest_height` surface.
    pub fn cover(
        source_width: f64,
        source_height: f64,
        dest_width: f64,
        dest_height: f64,
    ) -> Result<Self, GeometryError> {
        let s_width = check_dimension("source_width", source_width)?;
        let s_height = check_dimension("source_height", source_height)?;
        let dest_width = check_dimension("dest_width", dest_width)?;
        let dest_height = check_dimension("dest_height", dest_height)?;

        let h_ratio = dest_width / s_width;
        let v_ratio = dest_height / s_height;
        // max() fills the surface; min() would letterbox instead
        let ratio = h_ratio.max(v_ratio);

        let d_width = s_width * ratio;
        let d_height = s_height * ratio;

        Ok(Self {
            sx: 0.0,
            sy: 0.0,
            s_width,
            s_height,
            dx: (dest_width - d_width) / 2.0,
            dy: (dest_height - d_height) / 2.0,
            d_width,
            d_height,
            ratio,
        })
    }

    /// Map a destination point back to source coordinates
    pub fn source_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.sx + (x - self.dx) / self.ratio,
            self.sy + (y - self.dy) / self.ratio,
        )
    }

    /// Whether the destination rectangle fully covers a `width`x`height` surface
    pub fn covers(&self, width: f64, height: f64) -> bool {
        const EPS: f64 = 1e-9;
        let tol_w = EPS * width.max(1.0);
        let tol_h = EPS * height.max(1.0);
        self.dx <= tol_w
            && self.dy <= tol_h
            && self.dx + self.d_width >= width - tol_w
            && self.dy + self.d_height >= height - tol_h
    }

    /// Portion of the source image that ends up visible on the surface
    pub fn visible_source(&self, width: f64, height: f64) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.source_point(0.0_f64.max(self.dx), 0.0_f64.max(self.dy));
        let (x1, y1) = self.source_point(
            width.min(self.dx + self.d_width),
            height.min(self.dy + self.d_height),
        );
        (x0, y0, x1 - x0, y1 - y0)
    }
}

/// Cover-fit placement of a source image onto a destination surface
pub fn cover_fit(
    source_width: f64,
    source_height: f64,
    dest_width: f64,
    dest_height: f64,
) -> Result<FramePlacement, GeometryError> {
    FramePlacement::cover(source_width, source_height, dest_width, dest_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn test_landscape_into_square() {
        let frame = cover_fit(640.0, 480.0, 352.0, 352.0).unwrap();

        assert!((frame.ratio - 352.0 / 480.0).abs() < 1e-12);
        assert!(approx(frame.ratio, 0.7333));
        assert!(approx(frame.d_width, 469.33));
        assert!(approx(frame.d_height, 352.0));
        assert!(approx(frame.dx, -58.67));
        assert_eq!(frame.dy, 0.0);
        assert_eq!((frame.sx, frame.sy), (0.0, 0.0));
        assert_eq!((frame.s_width, frame.s_height), (640.0, 480.0));
    }

    #[test]
    fn test_same_aspect_has_no_crop() {
        let frame = cover_fit(352.0, 288.0, 704.0, 576.0).unwrap();
        assert_eq!(frame.ratio, 2.0);
        assert_eq!(frame.dx, 0.0);
        assert_eq!(frame.dy, 0.0);
        assert_eq!(frame.d_width, 704.0);
    }

    #[test]
    fn test_portrait_source_crops_vertically() {
        let frame = cover_fit(288.0, 352.0, 352.0, 288.0).unwrap();
        assert_eq!(frame.dx, 0.0);
        assert!(frame.dy < 0.0);
        assert!(frame.covers(352.0, 288.0));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert_eq!(
            cover_fit(0.0, 480.0, 352.0, 352.0),
            Err(GeometryError::InvalidDimension { field: "source_width", value: 0.0 })
        );
        assert!(cover_fit(640.0, f64::NAN, 352.0, 352.0).is_err());
        assert!(cover_fit(640.0, 480.0, f64::INFINITY, 352.0).is_err());
        assert!(cover_fit(640.0, 480.0, 352.0, -1.0).is_err());
    }

    #[test]
    fn test_source_point_maps_surface_center() {
        let frame = cover_fit(640.0, 480.0, 352.0, 352.0).unwrap();
        let (x, y) = frame.source_point(176.0, 176.0);
        assert!(approx(x, 320.0));
        assert!(approx(y, 240.0));
    }

    #[test]
    fn test_visible_source_is_center_crop() {
        let frame = cover_fit(640.0, 480.0, 352.0, 352.0).unwrap();
        let (x, y, w, h) = frame.visible_source(352.0, 352.0);
        assert!(approx(x, 80.0));
        assert!(approx(y, 0.0));
        assert!(approx(w, 480.0));
        assert!(approx(h, 480.0));
    }

    proptest! {
        #[test]
        fn prop_cover_fit_covers_and_centers(
            sw in 1.0f64..4096.0,
            sh in 1.0f64..4096.0,
            dw in 1.0f64..4096.0,
            dh in 1.0f64..4096.0,
        ) {
            let frame = cover_fit(sw, sh, dw, dh).unwrap();
            let tol = 1e-6 * dw.max(dh);

            prop_assert!(frame.d_width >= dw - tol);
            prop_assert!(frame.d_height >= dh - tol);
            prop_assert!((frame.dx + frame.d_width / 2.0 - dw / 2.0).abs() <= tol);
            prop_assert!((frame.dy + frame.d_height / 2.0 - dh / 2.0).abs() <= tol);
            prop_assert!((frame.d_width - frame.s_width * frame.ratio).abs() <= tol);
            prop_assert!((frame.d_height - frame.s_height * frame.ratio).abs() <= tol);
            prop_assert!(frame.covers(dw, dh));
        }

        #[test]
        fn prop_one_axis_is_exact(
            sw in 1.0f64..4096.0,
            sh in 1.0f64..4096.0,
            dw in 1.0f64..4096.0,
            dh in 1.0f64..4096.0,
        ) {
            let frame = cover_fit(sw, sh, dw, dh).unwrap();
            let tol = 1e-6 * dw.max(dh);
            let width_exact = (frame.d_width - dw).abs() <= tol;
            let height_exact = (frame.d_height - dh).abs() <= tol;
            prop_assert!(width_exact || height_exact);
        }
    }
}
