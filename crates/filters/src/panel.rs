//! Image filter panel: the procedural sample picture run through one filter.
//!
//! The filtered buffer is cached and only recomputed when the parameters or
//! the surface change; rendering just hands the bytes to the frame.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::params::{number_schema, param_f64_in, param_string};
use image::RgbaImage;
use serde_json::{json, Value};

use crate::{apply, sample_image, Filter};

const DEFAULT_INTENSITY: f64 = 1.0;
const MIN_INTENSITY: f64 = 0.1;
const MAX_INTENSITY: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiltersParams {
    pub filter: Filter,
    pub intensity: f64,
}

impl Default for FiltersParams {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            intensity: DEFAULT_INTENSITY,
        }
    }
}

impl FiltersParams {
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Result<Self, EngineError> {
        let filter = match params.get("filter") {
            Some(_) => Filter::from_name(&param_string(params, "filter", self.filter.name()))?,
            None => self.filter,
        };
        Ok(Self {
            filter,
            intensity: param_f64_in(params, "intensity", self.intensity, MIN_INTENSITY, MAX_INTENSITY),
        })
    }
}

pub struct FiltersPanel {
    surface: Surface,
    params: FiltersParams,
    source: RgbaImage,
    output: RgbaImage,
}

impl FiltersPanel {
    pub fn new(surface: Surface, params: FiltersParams) -> Result<Self, EngineError> {
        let source = source_for(surface)?;
        let output = apply(&source, params.filter, params.intensity);
        Ok(Self {
            surface,
            params,
            source,
            output,
        })
    }

    pub fn from_json(surface: Surface, params: &Value) -> Result<Self, EngineError> {
        Self::new(surface, FiltersParams::from_json(params)?)
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn output(&self) -> &RgbaImage {
        &self.output
    }

    fn refilter(&mut self) {
        self.output = apply(&self.source, self.params.filter, self.params.intensity);
        log::debug!(
            "filters: applied {} at intensity {:.2}",
            self.params.filter.name(),
            self.params.intensity
        );
    }
}

fn source_for(surface: Surface) -> Result<RgbaImage, EngineError> {
    let w = surface.width.round().max(1.0) as u32;
    let h = surface.height.round().max(1.0) as u32;
    sample_image(w, h)
}

impl Panel for FiltersPanel {
    fn name(&self) -> &'static str {
        "filters"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        let (w, h) = self.output.dimensions();
        frame.image(0.0, 0.0, w as usize, h as usize, self.output.as_raw().clone());
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        if let InputEvent::Action {
            action: PanelAction::Reset,
        } = event
        {
            self.params = FiltersParams::default();
            self.refilter();
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.source = source_for(surface)?;
        self.surface = surface;
        self.refilter();
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "filter": self.params.filter.name(),
            "intensity": self.params.intensity,
        })
    }

    fn param_schema(&self) -> Value {
        let names: Vec<&str> = Filter::ALL.iter().map(|f| f.name()).collect();
        json!({
            "filter": {
                "type": "string",
                "default": Filter::default().name(),
                "enum": names,
                "description": "Filter applied to the sample image"
            },
            "intensity": number_schema(
                DEFAULT_INTENSITY,
                MIN_INTENSITY,
                MAX_INTENSITY,
                "Scale applied to convolution kernels"
            ),
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let next = self.params.merged(params)?;
        if next != self.params {
            self.params = next;
            self.refilter();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::DrawCommand;

    fn panel() -> FiltersPanel {
        FiltersPanel::new(Surface::css(60.0, 40.0).unwrap(), FiltersParams::default()).unwrap()
    }

    #[test]
    fn default_output_is_the_source() {
        let p = panel();
        assert_eq!(p.output(), p.source());
    }

    #[test]
    fn render_emits_one_surface_sized_image() {
        let p = panel();
        let mut frame = Frame::new(p.surface());
        p.render(&mut frame);
        match &frame.commands()[1] {
            DrawCommand::Image {
                width, height, rgba, ..
            } => {
                assert_eq!((*width, *height), (60, 40));
                assert_eq!(rgba.len(), 60 * 40 * 4);
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn grayscale_param_desaturates_output() {
        let mut p = panel();
        p.apply_params(&json!({"filter": "grayscale"})).unwrap();
        assert!(p.output().pixels().all(|px| px.0[0] == px.0[1] && px.0[1] == px.0[2]));
    }

    #[test]
    fn unknown_filter_is_rejected_and_state_kept() {
        let mut p = panel();
        assert!(p.apply_params(&json!({"filter": "sepia"})).is_err());
        assert_eq!(p.params()["filter"], "none");
    }

    #[test]
    fn intensity_is_clamped() {
        let mut p = panel();
        p.apply_params(&json!({"filter": "blur", "intensity": 10.0})).unwrap();
        assert_eq!(p.params()["intensity"], MAX_INTENSITY);
    }

    #[test]
    fn resize_rebuilds_buffers() {
        let mut p = panel();
        p.apply_params(&json!({"filter": "edge"})).unwrap();
        p.resize(Surface::css(20.0, 10.0).unwrap()).unwrap();
        assert_eq!(p.source().dimensions(), (20, 10));
        assert_eq!(p.output().dimensions(), (20, 10));
        assert_eq!(p.params()["filter"], "edge");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut p = panel();
        p.apply_params(&json!({"filter": "emboss", "intensity": 2.0})).unwrap();
        p.handle_input(&InputEvent::Action { action: PanelAction::Reset }, 0.0)
            .unwrap();
        assert_eq!(p.params(), json!({"filter": "none", "intensity": 1.0}));
        assert_eq!(p.output(), p.source());
    }
}
