//! Built-in media source table (where a release was ripped from).

use super::BuiltIn;

pub(crate) const SOURCES: &[BuiltIn] = &[
    BuiltIn {
        canonical: "UHD_BLURAY",
        display: "UHD Blu-ray",
        alternates: &["UHD", "UHDBluRay", "4K Blu-ray", "UHD-BD"],
    },
    BuiltIn {
        canonical: "BLURAY",
        display: "Blu-ray",
        alternates: &["BluRay", "BD", "BDRip", "BRRip", "BD25", "BD50"],
    },
    BuiltIn {
        canonical: "HDDVD",
        display: "HD-DVD",
        alternates: &["HDDVDRip"],
    },
    BuiltIn {
        canonical: "DVD",
        display: "DVD",
        alternates: &["DVDRip", "DVD5", "DVD9", "DVDR"],
    },
    BuiltIn {
        canonical: "TV",
        display: "TV",
        alternates: &["HDTV", "PDTV", "SDTV", "DSR", "TVRip"],
    },
    BuiltIn {
        canonical: "WEB_DL",
        display: "Web-DL",
        alternates: &["WEB", "WEBDL", "WEBRip", "Stream"],
    },
    BuiltIn {
        canonical: "VHS",
        display: "VHS",
        alternates: &["VHSRip"],
    },
    BuiltIn {
        canonical: "VCD",
        display: "VCD",
        alternates: &["SVCD"],
    },
    BuiltIn {
        canonical: "LASERDISC",
        display: "LaserDisc",
        alternates: &["LD"],
    },
    BuiltIn {
        canonical: "CAM",
        display: "Cam",
        alternates: &["HDCAM", "TS", "Telesync", "Telecine"],
    },
];
