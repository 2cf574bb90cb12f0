// Host-independent UI pieces: the element surface and the widgets that write to it.

pub mod counter;
pub mod surface;
pub mod widgets;
