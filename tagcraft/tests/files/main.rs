#![allow(missing_docs)]

mod asf;
mod flac;
mod mp4;
mod ogg;
mod util;
mod wav;
