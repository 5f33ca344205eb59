use std::sync::Arc;

use egui_winit::EventResponse;
use winit::window::Window;

use crate::{
    draw_context::DrawContext,
    params::{ParamValue, ParameterSet, SharedParameters, snap},
    surface::Overlay,
};

/// egui state for one window, painting the parameter panel over the scene.
pub struct EguiOverlay {
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    window: Arc<Window>,
    params: SharedParameters,
}

impl EguiOverlay {
    pub fn new(draw_context: &DrawContext, window: Arc<Window>, params: SharedParameters) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let egui_state = egui_winit::State::new(
            egui::Context::default(),
            egui::ViewportId::default(),
            &Arc::clone(&window),
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &draw_context.device,
            draw_context.surface_config.format,
            Some(DrawContext::DEPTH_FORMAT),
            draw_context.sample_count(),
            true,
        );
        Self {
            egui_state,
            egui_renderer,
            window,
            params,
        }
    }

    pub fn on_window_event(&mut self, event: &winit::event::WindowEvent) -> EventResponse {
        self.egui_state.on_window_event(&self.window, event)
    }

    pub fn wants_pointer_input(&self) -> bool {
        self.egui_state.egui_ctx().wants_pointer_input()
    }
}

impl Overlay for EguiOverlay {
    fn draw(
        &mut self,
        context: &DrawContext,
        pixel_ratio: f64,
        render_pass: &mut wgpu::RenderPass<'static>,
    ) {
        #[allow(clippy::cast_possible_truncation)]
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [context.surface_config.width, context.surface_config.height],
            pixels_per_point: pixel_ratio as f32,
        };
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_context = self.egui_state.egui_ctx().clone();
        egui_context.set_pixels_per_point(screen_descriptor.pixels_per_point);
        let full_output = egui_context.run(raw_input, |ctx| {
            parameter_panel(ctx, &mut self.params.borrow_mut());
        });
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let tris = egui_context.tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&context.device, &context.queue, *id, image_delta);
        }
        // No paint callbacks, so this encoder never needs submitting.
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        self.egui_renderer.update_buffers(
            &context.device,
            &context.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        self.egui_renderer
            .render(render_pass, &tris, &screen_descriptor);
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

/// Draws one widget per parameter. Edits are written back into `params` only.
pub fn parameter_panel(ctx: &egui::Context, params: &mut ParameterSet) {
    egui::Window::new("Parameters")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            for (_, param) in params.iter_mut() {
                let label = param.label.as_str();
                match &mut param.value {
                    ParamValue::Float {
                        value,
                        min,
                        max,
                        step,
                    } => {
                        let mut edited = *value;
                        let slider = egui::Slider::new(&mut edited, *min..=*max)
                            .step_by(f64::from(*step))
                            .text(label);
                        if ui.add(slider).changed() {
                            *value = snap(edited, *min, *max, *step);
                        }
                    }
                    ParamValue::Bool(value) => {
                        ui.checkbox(value, label);
                    }
                    ParamValue::Color(value) => {
                        ui.horizontal(|ui| {
                            ui.color_edit_button_rgb(value);
                            ui.label(label);
                        });
                    }
                    ParamValue::Action { triggered } => {
                        if ui.button(label).clicked() {
                            *triggered = true;
                        }
                    }
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_without_input_leaves_values() {
        let mut params = ParameterSet::new();
        params
            .add_float("px", "Position X", 0.5, -3.0..=3.0, 0.01)
            .add_bool("visible", "Mesh Visible", true)
            .add_color("color", "Color", [1.0, 0.0, 0.0])
            .add_action("spin", "Spin Mesh");
        let ctx = egui::Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                parameter_panel(ctx, &mut params);
            });
        }
        assert_eq!(params.float("px"), Some(0.5));
        assert_eq!(params.bool("visible"), Some(true));
        assert_eq!(params.color("color"), Some([1.0, 0.0, 0.0]));
        assert!(!params.take_action("spin"));
    }
}
