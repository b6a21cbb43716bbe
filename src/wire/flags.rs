use bitflags::bitflags;

bitflags! {
    /// Flags carried by an OP_INSERT message.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InsertFlags: i32 {
        /// Keep inserting the remaining documents of the message after one fails.
        const CONTINUE_ON_ERROR = 0b0000_0001;
    }
}

bitflags! {
    /// Flags carried by an OP_UPDATE message.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct UpdateFlags: i32 {
        /// Insert the update document if no document matches the selector.
        const UPSERT = 0b0000_0001;
        /// Update every matching document rather than only the first.
        const MULTI  = 0b0000_0010;
    }
}

bitflags! {
    /// Flags carried by an OP_DELETE message.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DeleteFlags: i32 {
        /// Remove only the first matching document.
        const SINGLE_REMOVE = 0b0000_0001;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct QueryFlags: i32 {
        const SLAVE_OK = 0b0000_0100;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct ResponseFlags: i32 {
        const CURSOR_NOT_FOUND = 0b0000_0001;
        const QUERY_FAILURE    = 0b0000_0010;
        const AWAIT_CAPABLE    = 0b0000_1000;
    }
}
