// Renders ```svgbob blocks in crate docs when the "doc" feature is on; otherwise the
// diagram stays as plain text. Only inner `//!` docs go through it.
#[cfg(feature = "doc")]
macro_rules! layout_doc {
    (
        $($t:tt)*
    ) => (
        svgbobdoc::transform!(
            $($t)*
        )
    )
}

#[cfg(not(feature = "doc"))]
macro_rules! layout_doc {
    (
        $( #![doc = $d:literal] )*
    ) => (
        core::concat!( $( $d, '\n' ),* )
    );
}

pub(crate) use layout_doc;
