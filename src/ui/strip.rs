use iced::widget::image::Handle;
use iced::widget::{button, column, container, text, Image};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;
use std::collections::HashMap;

use crate::media::thumbnail::Thumbnail;
use crate::state::data::ImageAsset;
use crate::Message;

/// Edge length of a strip tile
const TILE: f32 = 110.0;

/// GPU handle for a thumbnail
pub fn handle_for(thumbnail: &Thumbnail) -> Handle {
    Handle::from_rgba(thumbnail.width, thumbnail.height, thumbnail.rgba.clone())
}

fn picture<'a>(handle: Option<&Handle>, fallback: &str) -> Element<'a, Message> {
    match handle {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fixed(TILE))
            .height(Length::Fixed(TILE * 0.75))
            .into(),
        None => container(text(fallback.to_string()).size(11))
            .width(Length::Fixed(TILE))
            .height(Length::Fixed(TILE * 0.75))
            .center_x(Length::Fixed(TILE))
            .center_y(Length::Fixed(TILE * 0.75))
            .into(),
    }
}

/// Uploaded images in slot order.
///
/// Tiles are clickable for reordering and carry a delete button.
pub fn pending_grid<'a>(
    assets: &'a [ImageAsset],
    handles: &HashMap<u64, Handle>,
    selected: Option<usize>,
) -> Element<'a, Message> {
    let tiles: Vec<Element<'a, Message>> = assets
        .iter()
        .enumerate()
        .map(|(position, asset)| {
            let tile = column![
                picture(handles.get(&asset.id), &asset.name),
                text(format!("#{}", asset.original_index + 1)).size(12),
                button(text("Remove").size(11))
                    .style(button::danger)
                    .on_press(Message::RemoveUpload(asset.id)),
            ]
            .spacing(4)
            .align_x(Alignment::Center);

            let style = if selected == Some(position) { button::primary } else { button::text };
            button(tile)
                .style(style)
                .padding(4)
                .on_press(Message::ThumbnailClicked(position))
                .into()
        })
        .collect();

    Wrap::with_elements(tiles).spacing(8.0).line_spacing(8.0).into()
}

/// Committed crops, ordered by slot
pub fn processed_grid<'a>(assets: &'a [ImageAsset], handles: &HashMap<u64, Handle>) -> Element<'a, Message> {
    let mut sorted: Vec<&ImageAsset> = assets.iter().collect();
    sorted.sort_by_key(|a| a.original_index);

    let tiles: Vec<Element<'a, Message>> = sorted
        .into_iter()
        .map(|asset| {
            column![
                picture(handles.get(&asset.id), &asset.name),
                text(crate::ui::slot_label(asset.original_index)).size(11),
            ]
            .spacing(4)
            .align_x(Alignment::Center)
            .into()
        })
        .collect();

    Wrap::with_elements(tiles).spacing(8.0).line_spacing(8.0).into()
}
