/// Type codes of top-level tags
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
#[repr(u16)]
pub enum TagCode {
    End = 0,
    ShowFrame = 1,
    DefineShape = 2,
    PlaceObject = 4,
    RemoveObject = 5,
    DefineBits = 6,
    DefineButton = 7,
    JpegTables = 8,
    SetBackgroundColor = 9,
    DefineFont = 10,
    DefineText = 11,
    DoAction = 12,
    DefineFontInfo = 13,
    DefineSound = 14,
    StartSound = 15,
    DefineButtonSound = 17,
    SoundStreamHead = 18,
    SoundStreamBlock = 19,
    DefineBitsLossless = 20,
    DefineBitsJpeg2 = 21,
    DefineShape2 = 22,
    DefineButtonCxform = 23,
    Protect = 24,
    PlaceObject2 = 26,
    RemoveObject2 = 28,
    DefineShape3 = 32,
    DefineText2 = 33,
    DefineButton2 = 34,
    DefineBitsJpeg3 = 35,
    DefineBitsLossless2 = 36,
    DefineEditText = 37,
    DefineSprite = 39,
    FrameLabel = 43,
    SoundStreamHead2 = 45,
    DefineMorphShape = 46,
    DefineFont2 = 48,
    ExportAssets = 56,
    ImportAssets = 57,
    EnableDebugger = 58,
    DoInitAction = 59,
    DefineVideoStream = 60,
    VideoFrame = 61,
    DefineFontInfo2 = 62,
    EnableDebugger2 = 64,
    ScriptLimits = 65,
    SetTabIndex = 66,
    FileAttributes = 69,
    PlaceObject3 = 70,
    ImportAssets2 = 71,
    DefineFontAlignZones = 73,
    CsmTextSettings = 74,
    DefineFont3 = 75,
    SymbolClass = 76,
    Metadata = 77,
    DefineScalingGrid = 78,
    DoAbc = 82,
    DefineShape4 = 83,
    DefineMorphShape2 = 84,
    DefineSceneAndFrameLabelData = 86,
    DefineBinaryData = 87,
    DefineFontName = 88,
    StartSound2 = 89,
    DefineBitsJpeg4 = 90,
    DefineFont4 = 91,
}

impl TagCode {
    /// Tags that players only accept with the extended header, whatever their length
    pub fn requires_long_header(self) -> bool {
        matches!(
            self,
            TagCode::DefineBits
                | TagCode::SoundStreamBlock
                | TagCode::DefineBitsLossless
                | TagCode::DefineBitsJpeg2
                | TagCode::DefineBitsJpeg3
                | TagCode::DefineBitsLossless2
                | TagCode::DefineBitsJpeg4
        )
    }

    /// The version of a shape definition tag, `None` for any other tag
    pub fn shape_version(self) -> Option<u8> {
        match self {
            TagCode::DefineShape => Some(1),
            TagCode::DefineShape2 => Some(2),
            TagCode::DefineShape3 => Some(3),
            TagCode::DefineShape4 => Some(4),
            _ => None,
        }
    }
}

impl From<TagCode> for u16 {
    fn from(code: TagCode) -> Self {
        code as u16
    }
}

impl TryFrom<u16> for TagCode {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::End),
            1 => Ok(Self::ShowFrame),
            2 => Ok(Self::DefineShape),
            4 => Ok(Self::PlaceObject),
            5 => Ok(Self::RemoveObject),
            6 => Ok(Self::DefineBits),
            7 => Ok(Self::DefineButton),
            8 => Ok(Self::JpegTables),
            9 => Ok(Self::SetBackgroundColor),
            10 => Ok(Self::DefineFont),
            11 => Ok(Self::DefineText),
            12 => Ok(Self::DoAction),
            13 => Ok(Self::DefineFontInfo),
            14 => Ok(Self::DefineSound),
            15 => Ok(Self::StartSound),
            17 => Ok(Self::DefineButtonSound),
            18 => Ok(Self::SoundStreamHead),
            19 => Ok(Self::SoundStreamBlock),
            20 => Ok(Self::DefineBitsLossless),
            21 => Ok(Self::DefineBitsJpeg2),
            22 => Ok(Self::DefineShape2),
            23 => Ok(Self::DefineButtonCxform),
            24 => Ok(Self::Protect),
            26 => Ok(Self::PlaceObject2),
            28 => Ok(Self::RemoveObject2),
            32 => Ok(Self::DefineShape3),
            33 => Ok(Self::DefineText2),
            34 => Ok(Self::DefineButton2),
            35 => Ok(Self::DefineBitsJpeg3),
            36 => Ok(Self::DefineBitsLossless2),
            37 => Ok(Self::DefineEditText),
            39 => Ok(Self::DefineSprite),
            43 => Ok(Self::FrameLabel),
            45 => Ok(Self::SoundStreamHead2),
            46 => Ok(Self::DefineMorphShape),
            48 => Ok(Self::DefineFont2),
            56 => Ok(Self::ExportAssets),
            57 => Ok(Self::ImportAssets),
            58 => Ok(Self::EnableDebugger),
            59 => Ok(Self::DoInitAction),
            60 => Ok(Self::DefineVideoStream),
            61 => Ok(Self::VideoFrame),
            62 => Ok(Self::DefineFontInfo2),
            64 => Ok(Self::EnableDebugger2),
            65 => Ok(Self::ScriptLimits),
            66 => Ok(Self::SetTabIndex),
            69 => Ok(Self::FileAttributes),
            70 => Ok(Self::PlaceObject3),
            71 => Ok(Self::ImportAssets2),
            73 => Ok(Self::DefineFontAlignZones),
            74 => Ok(Self::CsmTextSettings),
            75 => Ok(Self::DefineFont3),
            76 => Ok(Self::SymbolClass),
            77 => Ok(Self::Metadata),
            78 => Ok(Self::DefineScalingGrid),
            82 => Ok(Self::DoAbc),
            83 => Ok(Self::DefineShape4),
            84 => Ok(Self::DefineMorphShape2),
            86 => Ok(Self::DefineSceneAndFrameLabelData),
            87 => Ok(Self::DefineBinaryData),
            88 => Ok(Self::DefineFontName),
            89 => Ok(Self::StartSound2),
            90 => Ok(Self::DefineBitsJpeg4),
            91 => Ok(Self::DefineFont4),
            _ => Err(()),
        }
    }
}
