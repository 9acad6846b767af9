//! Retained drawing surface shared by every scene.
//!
//! The canvas owns the two axes (drawn once, never removed) and a list of
//! tagged groups. Scenes add groups through [`Canvas::begin_layer`]; the
//! layer lifecycle removes them by tag. Renderers only ever see the
//! flattened output of [`Canvas::commands`].

use std::sync::Arc;

use lifeline_protocol::{Paint, Point, Rect, RenderCommand, Viewport};

use crate::scales::ScaleRegistry;
use crate::tooltip::HoverHandler;
use crate::views::axis::render_axes;

/// Extra pixels around a mark that still count as hovering it.
const HOVER_SLOP: f64 = 2.0;

/// The kind of content a group holds.
///
/// `Plot` and `Annotation` groups are drawn in plot space (translated by the
/// margins); `Controls` and `Tooltip` groups are drawn in outer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerTag {
    Plot,
    Annotation,
    Controls,
    Tooltip,
}

impl LayerTag {
    pub fn class(self) -> &'static str {
        match self {
            LayerTag::Plot => "plot-layer",
            LayerTag::Annotation => "annotation-group",
            LayerTag::Controls => "controls",
            LayerTag::Tooltip => "tooltip",
        }
    }

    pub fn in_plot_space(self) -> bool {
        matches!(self, LayerTag::Plot | LayerTag::Annotation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(u64);

/// Identifies one hover target: the group it lives in and its position there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoverKey {
    pub group: GroupId,
    pub slot: usize,
}

/// A hover-sensitive mark, in plot space.
#[derive(Clone)]
pub struct HoverTarget {
    pub center: Point,
    pub radius: f64,
    /// Index of the record in the session dataset.
    pub record: usize,
    pub handler: Arc<dyn HoverHandler>,
}

impl std::fmt::Debug for HoverTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverTarget")
            .field("center", &self.center)
            .field("radius", &self.radius)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// What a click on scene-injected control content asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    SelectCountry(String),
    ToggleProjection,
}

/// A clickable control region, in outer space.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlTarget {
    pub rect: Rect,
    pub action: ControlAction,
}

#[derive(Debug)]
struct Group {
    id: GroupId,
    tag: LayerTag,
    commands: Vec<RenderCommand>,
    hover: Vec<HoverTarget>,
    controls: Vec<ControlTarget>,
}

#[derive(Debug)]
pub struct Canvas {
    viewport: Viewport,
    axes: Vec<RenderCommand>,
    groups: Vec<Group>,
    next_group: u64,
}

impl Canvas {
    /// Create the surface and draw both axes. Axes survive every teardown.
    pub fn new(viewport: Viewport, scales: &ScaleRegistry) -> Self {
        Self {
            viewport,
            axes: render_axes(&viewport, scales),
            groups: Vec::new(),
            next_group: 0,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Start a fresh group tagged `tag`. Every call creates a new group;
    /// nothing is reused from earlier renders.
    pub fn begin_layer(&mut self, tag: LayerTag) -> LayerBuilder<'_> {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        self.groups.push(Group {
            id,
            tag,
            commands: Vec::new(),
            hover: Vec::new(),
            controls: Vec::new(),
        });
        let index = self.groups.len() - 1;
        LayerBuilder {
            group: &mut self.groups[index],
        }
    }

    /// Remove every group tagged `tag`, along with its hover and control
    /// targets. Returns how many groups were removed.
    pub fn remove_layers(&mut self, tag: LayerTag) -> usize {
        let before = self.groups.len();
        self.groups.retain(|g| g.tag != tag);
        before - self.groups.len()
    }

    pub fn layer_count(&self, tag: LayerTag) -> usize {
        self.groups.iter().filter(|g| g.tag == tag).count()
    }

    /// All drawing commands in groups tagged `tag`.
    pub fn layer_commands(&self, tag: LayerTag) -> impl Iterator<Item = &RenderCommand> {
        self.groups
            .iter()
            .filter(move |g| g.tag == tag)
            .flat_map(|g| g.commands.iter())
    }

    pub fn axes(&self) -> &[RenderCommand] {
        &self.axes
    }

    pub fn hover_targets(&self) -> impl Iterator<Item = &HoverTarget> {
        self.groups.iter().flat_map(|g| g.hover.iter())
    }

    pub fn control_targets(&self) -> impl Iterator<Item = &ControlTarget> {
        self.groups.iter().flat_map(|g| g.controls.iter())
    }

    /// The hover target under `outer` (page coordinates), if any. When marks
    /// overlap the closest center wins; ties go to the mark drawn last.
    pub fn hover_target_at(&self, outer: Point) -> Option<(HoverKey, &HoverTarget)> {
        let p = self.viewport.to_plot(outer);
        let mut best: Option<(f64, HoverKey, &HoverTarget)> = None;
        for group in &self.groups {
            for (slot, target) in group.hover.iter().enumerate() {
                let d = target.center.distance(p);
                if d > target.radius + HOVER_SLOP {
                    continue;
                }
                if best.as_ref().is_none_or(|(bd, _, _)| d <= *bd) {
                    let key = HoverKey {
                        group: group.id,
                        slot,
                    };
                    best = Some((d, key, target));
                }
            }
        }
        best.map(|(_, key, target)| (key, target))
    }

    /// The control under `outer` (page coordinates), if any.
    pub fn control_at(&self, outer: Point) -> Option<&ControlTarget> {
        self.control_targets().find(|c| c.rect.contains(outer))
    }

    /// Flatten the canvas into renderer input: plot-space content (axes,
    /// plot layers, annotations) inside one translate, followed by the
    /// outer-space controls and the tooltip on top.
    pub fn commands(&self) -> Vec<RenderCommand> {
        let mut out = Vec::with_capacity(self.axes.len() + 64);
        out.push(RenderCommand::PushTransform {
            translate: self.viewport.plot_origin(),
        });
        out.extend(self.axes.iter().cloned());
        for tag in [LayerTag::Plot, LayerTag::Annotation] {
            self.emit_groups(tag, &mut out);
        }
        out.push(RenderCommand::PopTransform);
        for tag in [LayerTag::Controls, LayerTag::Tooltip] {
            self.emit_groups(tag, &mut out);
        }
        out
    }

    fn emit_groups(&self, tag: LayerTag, out: &mut Vec<RenderCommand>) {
        for group in self.groups.iter().filter(|g| g.tag == tag) {
            out.push(RenderCommand::BeginGroup {
                id: format!("{}-{}", tag.class(), group.id.0),
                class: tag.class().to_string(),
            });
            out.extend(group.commands.iter().cloned());
            out.push(RenderCommand::EndGroup);
        }
    }
}

/// Write access to one freshly created group.
pub struct LayerBuilder<'c> {
    group: &'c mut Group,
}

impl LayerBuilder<'_> {
    pub fn id(&self) -> GroupId {
        self.group.id
    }

    pub fn push(&mut self, command: RenderCommand) -> &mut Self {
        self.group.commands.push(command);
        self
    }

    pub fn circle(&mut self, center: Point, radius: f64, fill: Paint, opacity: f32) -> &mut Self {
        self.push(RenderCommand::DrawCircle {
            center,
            radius,
            fill,
            opacity,
        })
    }

    /// Polyline through `points`. Fewer than two points draws nothing.
    pub fn path(
        &mut self,
        points: Vec<Point>,
        stroke: Paint,
        width: f64,
        opacity: f32,
        dashed: bool,
    ) -> &mut Self {
        if points.len() < 2 {
            return self;
        }
        self.push(RenderCommand::DrawPath {
            points,
            stroke,
            width,
            opacity,
            dashed,
        })
    }

    pub fn line(&mut self, from: Point, to: Point, color: Paint, width: f64) -> &mut Self {
        self.push(RenderCommand::DrawLine {
            from,
            to,
            color,
            width,
        })
    }

    pub fn rect(&mut self, rect: Rect, fill: Paint, border: Option<Paint>) -> &mut Self {
        self.push(RenderCommand::DrawRect { rect, fill, border })
    }

    pub fn hover(&mut self, target: HoverTarget) -> &mut Self {
        self.group.hover.push(target);
        self
    }

    pub fn control(&mut self, rect: Rect, action: ControlAction) -> &mut Self {
        self.group.controls.push(ControlTarget { rect, action });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.group.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::model::Dataset;
    use crate::tooltip::RecordTooltip;
    use lifeline_protocol::ThemeToken;

    fn canvas() -> Canvas {
        let config = StoryConfig::default();
        let scales = ScaleRegistry::build(&Dataset::default(), &config);
        Canvas::new(config.viewport(), &scales)
    }

    fn dot(center: Point) -> HoverTarget {
        HoverTarget {
            center,
            radius: 3.0,
            record: 0,
            handler: Arc::new(RecordTooltip),
        }
    }

    #[test]
    fn axes_survive_layer_removal() {
        let mut c = canvas();
        let axes = c.axes().len();
        assert!(axes > 0);
        c.begin_layer(LayerTag::Plot)
            .circle(Point::new(1.0, 1.0), 4.0, ThemeToken::NeutralMark.into(), 1.0);
        assert_eq!(c.remove_layers(LayerTag::Plot), 1);
        assert_eq!(c.remove_layers(LayerTag::Plot), 0);
        assert_eq!(c.axes().len(), axes);
    }

    #[test]
    fn commands_wrap_plot_space_in_transform() {
        let mut c = canvas();
        c.begin_layer(LayerTag::Tooltip)
            .rect(Rect::new(0.0, 0.0, 10.0, 10.0), ThemeToken::TooltipBackground.into(), None);
        c.begin_layer(LayerTag::Plot)
            .circle(Point::new(1.0, 1.0), 4.0, ThemeToken::NeutralMark.into(), 1.0);
        let cmds = c.commands();
        assert!(matches!(cmds[0], RenderCommand::PushTransform { .. }));
        let pop = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::PopTransform))
            .unwrap();
        let circle = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::DrawCircle { .. }))
            .unwrap();
        let rect = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::DrawRect { .. }))
            .unwrap();
        assert!(circle < pop);
        assert!(rect > pop);
    }

    #[test]
    fn hover_hit_test_uses_plot_space_and_prefers_closest() {
        let mut c = canvas();
        {
            let mut layer = c.begin_layer(LayerTag::Plot);
            layer.hover(dot(Point::new(100.0, 100.0)));
            layer.hover(dot(Point::new(104.0, 100.0)));
        }
        // Margins are left 60, top 40.
        let (key, target) = c.hover_target_at(Point::new(163.5, 140.0)).unwrap();
        assert_eq!(key.slot, 1);
        assert_eq!(target.center, Point::new(104.0, 100.0));
        assert!(c.hover_target_at(Point::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn removing_a_layer_drops_its_targets() {
        let mut c = canvas();
        c.begin_layer(LayerTag::Plot).hover(dot(Point::new(10.0, 10.0)));
        c.begin_layer(LayerTag::Controls).control(
            Rect::new(0.0, 0.0, 50.0, 20.0),
            ControlAction::ToggleProjection,
        );
        assert_eq!(c.hover_targets().count(), 1);
        assert_eq!(
            c.control_at(Point::new(5.0, 5.0)).map(|t| &t.action),
            Some(&ControlAction::ToggleProjection)
        );
        c.remove_layers(LayerTag::Plot);
        c.remove_layers(LayerTag::Controls);
        assert_eq!(c.hover_targets().count(), 0);
        assert!(c.control_at(Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn short_paths_are_dropped() {
        let mut c = canvas();
        c.begin_layer(LayerTag::Plot).path(
            vec![Point::new(0.0, 0.0)],
            ThemeToken::NeutralMark.into(),
            2.0,
            1.0,
            false,
        );
        assert_eq!(c.layer_commands(LayerTag::Plot).count(), 0);
    }
}
