mod geocode;
mod helpers;
mod pages;
mod ui_fragments;
