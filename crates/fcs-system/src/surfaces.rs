//! Aerosurface position state in radians, degrees, normalized travel and
//! magnitude form.

use std::cell::Cell;
use std::rc::Rc;

use fcs_core::units::{deg, rad};
use fcs_props::{PropertyResult, PropertyStore};
use uom::si::angle::{degree, radian};

use crate::commands::tie_cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    LeftAileron,
    RightAileron,
    Elevator,
    Rudder,
    Flap,
    Speedbrake,
    Spoiler,
}

impl Surface {
    pub const ALL: [Surface; 7] = [
        Surface::LeftAileron,
        Surface::RightAileron,
        Surface::Elevator,
        Surface::Rudder,
        Surface::Flap,
        Surface::Speedbrake,
        Surface::Spoiler,
    ];

    /// Name stem used in property names.
    pub fn stem(self) -> &'static str {
        match self {
            Surface::LeftAileron => "left-aileron",
            Surface::RightAileron => "right-aileron",
            Surface::Elevator => "elevator",
            Surface::Rudder => "rudder",
            Surface::Flap => "flap",
            Surface::Speedbrake => "speedbrake",
            Surface::Spoiler => "spoiler",
        }
    }
}

/// Snapshot of one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePosition {
    pub rad: f64,
    pub deg: f64,
    pub norm: f64,
    pub mag_rad: f64,
}

#[derive(Debug)]
struct SurfaceCells {
    rad: Rc<Cell<f64>>,
    norm: Rc<Cell<f64>>,
}

/// Position state of every aerosurface.
///
/// Degrees are a view of the radian value, so the two never disagree.
/// The magnitude is read-only and always `|rad|`. The normalized form is
/// stored separately.
#[derive(Debug)]
pub struct Aerosurfaces {
    cells: Vec<SurfaceCells>,
}

impl Aerosurfaces {
    pub fn bind(store: &mut PropertyStore) -> PropertyResult<Self> {
        let mut cells = Vec::with_capacity(Surface::ALL.len());
        for surface in Surface::ALL {
            let stem = surface.stem();
            let rad_cell = tie_cell(store, &format!("fcs/{stem}-pos-rad"))?;

            let read = Rc::clone(&rad_cell);
            let write = Rc::clone(&rad_cell);
            store.tie(
                &format!("fcs/{stem}-pos-deg"),
                Box::new(move || rad(read.get()).get::<degree>()),
                Some(Box::new(move |v| write.set(deg(v).get::<radian>()))),
            )?;

            let mag = Rc::clone(&rad_cell);
            store.tie(
                &format!("fcs/mag-{stem}-pos-rad"),
                Box::new(move || mag.get().abs()),
                None,
            )?;

            let norm = tie_cell(store, &format!("fcs/{stem}-pos-norm"))?;
            cells.push(SurfaceCells { rad: rad_cell, norm });
        }
        Ok(Self { cells })
    }

    fn cells(&self, surface: Surface) -> &SurfaceCells {
        &self.cells[surface as usize]
    }

    pub fn position(&self, surface: Surface) -> SurfacePosition {
        let cells = self.cells(surface);
        let r = cells.rad.get();
        SurfacePosition {
            rad: r,
            deg: rad(r).get::<degree>(),
            norm: cells.norm.get(),
            mag_rad: r.abs(),
        }
    }

    pub fn set_rad(&self, surface: Surface, value: f64) {
        self.cells(surface).rad.set(value);
    }

    pub fn set_norm(&self, surface: Surface, value: f64) {
        self.cells(surface).norm.set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_view_tracks_radians() {
        let mut store = PropertyStore::new();
        let surfaces = Aerosurfaces::bind(&mut store).unwrap();
        store.set_by_name("fcs/rudder-pos-rad", -0.5).unwrap();
        let deg_value = store.get_by_name("fcs/rudder-pos-deg").unwrap();
        assert!((deg_value + 0.5_f64.to_degrees()).abs() < 1e-12);
        assert_eq!(store.get_by_name("fcs/mag-rudder-pos-rad"), Some(0.5));

        store.set_by_name("fcs/rudder-pos-deg", 30.0).unwrap();
        let p = surfaces.position(Surface::Rudder);
        assert!((p.rad - 30.0_f64.to_radians()).abs() < 1e-12);
        assert!((p.deg - 30.0).abs() < 1e-12);
    }

    #[test]
    fn norm_is_independent() {
        let mut store = PropertyStore::new();
        let surfaces = Aerosurfaces::bind(&mut store).unwrap();
        surfaces.set_rad(Surface::Flap, 0.3);
        store.set_by_name("fcs/flap-pos-norm", 0.75).unwrap();
        let p = surfaces.position(Surface::Flap);
        assert_eq!(p.rad, 0.3);
        assert_eq!(p.norm, 0.75);
    }

    #[test]
    fn magnitude_is_read_only() {
        let mut store = PropertyStore::new();
        let surfaces = Aerosurfaces::bind(&mut store).unwrap();
        surfaces.set_rad(Surface::Elevator, -0.2);
        store.set_by_name("fcs/mag-elevator-pos-rad", 5.0).unwrap();
        assert_eq!(store.get_by_name("fcs/mag-elevator-pos-rad"), Some(0.2));
        assert_eq!(surfaces.position(Surface::Elevator).rad, -0.2);
    }
}
