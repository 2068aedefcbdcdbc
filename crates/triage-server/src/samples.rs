//! Sample intake emails for manual testing
//!
//! Four referral styles, from a tidy paralegal letter to a hurried note full
//! of hedges, used by the `triage-sample` binary to exercise a running server
//! or a live oracle.

use std::fmt;
use std::str::FromStr;
use triage_domain::{RawAttachment, RawEmail};

const TRIAGE_INBOX: &str = "triage@imecenter.com";

/// Writing style of a sample referral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStyle {
    /// Well-formatted letter with complete information
    Clean,
    /// Informal note with uncertain names, numbers and dates
    Messy,
    /// Formal memo with labelled sections
    Structured,
    /// Chatty, loosely organized message with hedged details
    Unstructured,
}

impl SampleStyle {
    /// Every style, in display order
    pub const ALL: [SampleStyle; 4] = [
        SampleStyle::Clean,
        SampleStyle::Messy,
        SampleStyle::Structured,
        SampleStyle::Unstructured,
    ];

    /// Name accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleStyle::Clean => "clean",
            SampleStyle::Messy => "messy",
            SampleStyle::Structured => "structured",
            SampleStyle::Unstructured => "unstructured",
        }
    }

    /// One-line description for usage output
    pub fn description(&self) -> &'static str {
        match self {
            SampleStyle::Clean => "Well-formatted, professional email with complete information",
            SampleStyle::Messy => "Informal email with uncertain names, numbers and dates",
            SampleStyle::Structured => "Formal memo with detailed, labelled sections",
            SampleStyle::Unstructured => "Very informal, minimal information, poorly organized",
        }
    }

    /// Build the sample email for this style
    pub fn email(&self) -> RawEmail {
        match self {
            SampleStyle::Clean => clean(),
            SampleStyle::Messy => messy(),
            SampleStyle::Structured => structured(),
            SampleStyle::Unstructured => unstructured(),
        }
    }
}

impl fmt::Display for SampleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown sample style: {}", s))
    }
}

fn email(subject: &str, sender: &str, body: &str, attachments: Vec<RawAttachment>) -> RawEmail {
    RawEmail {
        subject: subject.to_string(),
        sender: sender.to_string(),
        recipients: vec![TRIAGE_INBOX.to_string()],
        body: body.to_string(),
        attachments,
    }
}

fn clean() -> RawEmail {
    email(
        "New IME Referral - Sarah Johnson - Case #IM-2025-0456",
        "referrals@premiumlaw.com",
        "Dear Intake Team,

We would like to schedule an Independent Medical Examination.

Patient: Sarah Johnson
Date of Birth: March 22, 1985
Case Number: IM-2025-0456
Exam Type: Orthopedic IME
Requested Date: May 15, 2025
Location: Los Angeles, California

The claimant was injured in a motor vehicle accident on February 10, 2024.
Attached are her medical records and signed declaration.

Regards,
Michael Chen
Premium Law Firm",
        vec![
            RawAttachment::new(
                "Johnson_S_Medical_Records.pdf",
                "MEDICAL RECORDS - SARAH JOHNSON
Case: IM-2025-0456

February 10, 2024 - Los Angeles General Hospital, Dr. Emily Rodriguez
Diagnosis: Cervical strain, lumbar sprain

February 18, 2024 - Pacific Orthopedic Center, Dr. James Park
Diagnosis: L4-L5 disc herniation, cervical radiculopathy
Plan: Physical therapy, NSAIDs

Medications: Ibuprofen 600mg, Cyclobenzaprine 10mg, Gabapentin 300mg",
            ),
            RawAttachment::new(
                "Johnson_S_Declaration.pdf",
                "DECLARATION OF SARAH JOHNSON

I declare under penalty of perjury that on February 10, 2024 I was injured
in a motor vehicle accident at Main Street and Broadway, Los Angeles.
I have been treated by Dr. James Park since February 18, 2024.

Dated: April 1, 2025",
            ),
        ],
    )
}

fn messy() -> RawEmail {
    email(
        "ime needed asap",
        "intake@quicklaw.com",
        "hey,

need an ime set up soon. client is mike thompson or maybe thomson, not sure on spelling.
case number could be QT-8842 or QT-8843.
exam type: psych eval i think? or maybe neuro, he has head issues from a work accident.
date: sometime in june? july?
location: san fran or oakland area.

some pages might be missing from the docs.

thanks,
jennifer",
        vec![
            RawAttachment::new(
                "mike_records.pdf",
                "patient records
mike thompson/thomson

saw dr kim at a hospital in sf, maybe march 2024
complaint: headaches, memory problems
diagnosis: concussion? tbi?

oakland neuro center, dr patel i think
april, may, june 2024: meds, therapy",
            ),
            RawAttachment::new("more_docs.pdf", "additional records\nvarious dates\ntreatment ongoing"),
        ],
    )
}

fn structured() -> RawEmail {
    email(
        "IME Referral Request - Formal Submission - Case #LEG-2024-8921",
        "ime.referrals@corporatelaw.com",
        "TO: Intake Department
FROM: Corporate Law Associates
DATE: April 15, 2025
RE: Independent Medical Examination Request

CASE INFORMATION
Case Number: LEG-2024-8921
Claimant: David Martinez

INCIDENT
Date: November 5, 2023
Type: Workplace fall from height

EXAMINATION REQUEST
Type: Orthopedic IME
Preferred Date: June 10, 2025
Location: San Diego, California

Please review the enclosed cover letter and medical records.

Robert Anderson
Corporate Law Associates",
        vec![
            RawAttachment::new(
                "Martinez_Cover_Letter.pdf",
                "Dear Doctor,

Enclosed please find the referral for David Martinez, case LEG-2024-8921.
We require the IME report by July 1, 2025.

Sincerely,
Robert Anderson",
            ),
            RawAttachment::new(
                "Martinez_D_Complete_Medical_Records.pdf",
                "COMPREHENSIVE MEDICAL RECORDS - DAVID MARTINEZ

November 5, 2023 - San Diego Medical Center, Dr. Mark Thompson
Diagnosis: Right shoulder dislocation, L3-L4 compression fracture

December 10, 2023 - San Diego Orthopedic Specialists, Dr. Lisa Wang
MRI: Right rotator cuff tear

December 15, 2023 to March 20, 2024 - Rehab Plus Physical Therapy
Medications: Oxycodone 5mg as needed, Ibuprofen 800mg",
            ),
        ],
    )
}

fn unstructured() -> RawEmail {
    email(
        "help with ime",
        "info@smalllaw.com",
        "hi there,

our client amanda white was in a car crash, i think january 2023.
case number might be AW-2025-9911 or close to that.
we need an ime, orthopedic (neck/back) or maybe neuro.
maybe around july 15, 2025 but flexible. sacramento area.

she has been seeing dr. patel at a clinic in sacramento.

thanks!
bob",
        vec![RawAttachment::new(
            "records.pdf",
            "PATIENT: AMANDA WHITE
Case: AW-2025-9911 (approx)

Provider: Dr. R. Patel, Sacramento Spine Clinic
Feb 10, 2023: Initial eval, possible C5-C6 herniation
Mar 20, 2023: MRI shows C5-C6 disc protrusion

Diagnoses: Cervical disc herniation (C5-C6), lumbar strain",
        )],
    )
}
