//! UI extension panel descriptor.
//!
//! The panel is a static two-row page saved to the device once at
//! startup: each row pairs a text label with a toggle button. The toggle
//! widget ids are derived from the panel id, and their values are the
//! persistence layer for the mode flags.

use crate::config::PanelConfig;

#[derive(Debug, Clone)]
pub struct PanelSpec {
    pub panel_id: String,
    pub name: String,
    pub icon: String,
    pub hand_raise_text: String,
    pub active_speaker_text: String,
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self::from(&PanelConfig::default())
    }
}

impl From<&PanelConfig> for PanelSpec {
    fn from(config: &PanelConfig) -> Self {
        Self {
            panel_id: config.panel_id.clone(),
            name: config.name.clone(),
            icon: config.icon.clone(),
            hand_raise_text: config.hand_raise_text.clone(),
            active_speaker_text: config.active_speaker_text.clone(),
        }
    }
}

impl PanelSpec {
    pub fn hand_raise_widget_id(&self) -> String {
        format!("{}-handRaise", self.panel_id)
    }

    pub fn active_speaker_widget_id(&self) -> String {
        format!("{}-activeSpeaker", self.panel_id)
    }

    /// Render the panel XML. `order` comes from the device's extension
    /// list when the panel already exists, so a re-save keeps its place
    /// among other custom panels.
    pub fn render(&self, order: Option<u32>) -> String {
        let order_element = match order {
            Some(order) => format!("<Order>{}</Order>", order),
            None => String::new(),
        };

        format!(
            r#"<Extensions>
  <Panel>
    <Location>CallControls</Location>
    <Icon>{icon}</Icon>
    <Name>{name}</Name>
    <ActivityType>Custom</ActivityType>
    {order_element}
    <Page>
      <Name>{name}</Name>
      <Row>
        <Name>Row</Name>
        <Widget>
          <WidgetId>{panel_id}-handraise-text</WidgetId>
          <Name>{hand_raise_text}</Name>
          <Type>Text</Type>
          <Options>size=3;fontSize=normal;align=center</Options>
        </Widget>
        <Widget>
          <WidgetId>{hand_raise_widget}</WidgetId>
          <Type>ToggleButton</Type>
          <Options>size=1</Options>
        </Widget>
      </Row>
      <Row>
        <Name>Row</Name>
        <Widget>
          <WidgetId>{panel_id}-activespeaker-text</WidgetId>
          <Name>{active_speaker_text}</Name>
          <Type>Text</Type>
          <Options>size=3;fontSize=normal;align=center</Options>
        </Widget>
        <Widget>
          <WidgetId>{active_speaker_widget}</WidgetId>
          <Type>ToggleButton</Type>
          <Options>size=1</Options>
        </Widget>
      </Row>
      <Options>hideRowNames=1</Options>
    </Page>
  </Panel>
</Extensions>"#,
            icon = xml_escape(&self.icon),
            name = xml_escape(&self.name),
            panel_id = xml_escape(&self.panel_id),
            hand_raise_text = xml_escape(&self.hand_raise_text),
            active_speaker_text = xml_escape(&self.active_speaker_text),
            hand_raise_widget = xml_escape(&self.hand_raise_widget_id()),
            active_speaker_widget = xml_escape(&self.active_speaker_widget_id()),
            order_element = order_element,
        )
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
